use std::fmt::{Display, Formatter};

use tagforge_files::tag::class::{TagClass, display_path};
use tagforge_files::tag::relocatable::{NULL_ID, RelocatableData};

use crate::build::error::BuildError;

const ID_SALT: u32 = 0xE741;

/// Ids keep the slot index in 16 bits.
pub const MAX_SLOTS: usize = 0x10000;

/// A slot index plus a salt in the high half.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(u32);

impl TagId {
    pub const NULL: u32 = NULL_ID;

    pub fn from_index(index: usize) -> TagId {
        let index = index as u32 & 0xFFFF;
        TagId((((ID_SALT + index) & 0xFFFF) << 16) | index)
    }

    /// Accepts only well-formed ids, i.e. ones whose salt matches their index.
    pub fn from_raw(raw: u32) -> Option<TagId> {
        let id = TagId::from_index((raw & 0xFFFF) as usize);
        (raw != NULL_ID && id.0 == raw).then_some(id)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        (self.0 & 0xFFFF) as usize
    }
}

impl Display for TagId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagContent {
    pub body: RelocatableData,
    pub asset: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagRecord {
    pub class: TagClass,
    pub path: String,
    pub content: TagContent,
    /// Index into the stock resource map that replaces this tag's payload.
    pub indexed: Option<u32>,
    /// File offset of an identical payload emitted for an earlier tag.
    pub deduped: Option<u32>,
    /// Placeholder standing in for a tag that was never loaded.
    pub stub: bool,
}

impl TagRecord {
    pub fn new(class: TagClass, path: &str, content: TagContent) -> TagRecord {
        TagRecord {
            class,
            path: path.to_owned(),
            content,
            indexed: None,
            deduped: None,
            stub: false,
        }
    }

    pub fn display_path(&self) -> String {
        display_path(&self.path, self.class)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TagSlot {
    Stub { class: TagClass, path: String },
    Resolved(TagRecord),
}

impl TagSlot {
    pub fn class(&self) -> TagClass {
        match self {
            TagSlot::Stub { class, .. } => *class,
            TagSlot::Resolved(record) => record.class,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            TagSlot::Stub { path, .. } => path,
            TagSlot::Resolved(record) => &record.path,
        }
    }
}

/// Every tag of a build, addressed by [`TagId`]. Slots are never removed or reordered.
#[derive(Debug)]
pub struct TagArena {
    slots: Vec<TagSlot>,
    limit: usize,
}

impl Default for TagArena {
    fn default() -> Self {
        TagArena::new()
    }
}

impl TagArena {
    pub fn new() -> Self {
        TagArena::with_limit(MAX_SLOTS)
    }

    /// An arena refusing to hold more than `limit` tags, and never more than ids can address.
    pub fn with_limit(limit: usize) -> Self {
        TagArena {
            slots: Vec::new(),
            limit: limit.min(MAX_SLOTS),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn id_at(&self, index: usize) -> Option<TagId> {
        (index < self.slots.len()).then(|| TagId::from_index(index))
    }

    pub fn ids(&self) -> impl Iterator<Item = TagId> + use<> {
        (0..self.slots.len()).map(TagId::from_index)
    }

    pub fn find(&self, class: TagClass, path: &str) -> Option<TagId> {
        self.slots
            .iter()
            .position(|slot| slot.class() == class && slot.path() == path)
            .map(TagId::from_index)
    }

    pub fn reserve_stub(&mut self, class: TagClass, path: &str) -> Result<TagId, BuildError> {
        if self.slots.len() >= self.limit {
            return Err(BuildError::TagCountExceeded {
                count: self.slots.len() + 1,
                limit: self.limit,
            });
        }

        self.slots.push(TagSlot::Stub {
            class,
            path: path.to_owned(),
        });
        Ok(TagId::from_index(self.slots.len() - 1))
    }

    pub fn fill(&mut self, id: TagId, record: TagRecord) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            *slot = TagSlot::Resolved(record);
        }
    }

    pub fn slot(&self, id: TagId) -> Option<&TagSlot> {
        self.slots.get(id.index())
    }

    /// The record behind `id`, or `None` while it is still a stub.
    pub fn get(&self, id: TagId) -> Option<&TagRecord> {
        match self.slots.get(id.index()) {
            Some(TagSlot::Resolved(record)) => Some(record),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: TagId) -> Option<&mut TagRecord> {
        match self.slots.get_mut(id.index()) {
            Some(TagSlot::Resolved(record)) => Some(record),
            _ => None,
        }
    }

    pub fn records(&self) -> impl Iterator<Item = (TagId, &TagRecord)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| match slot {
            TagSlot::Resolved(record) => Some((TagId::from_index(index), record)),
            TagSlot::Stub { .. } => None,
        })
    }

    pub fn stubs(&self) -> Vec<TagId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot, TagSlot::Stub { .. }))
            .map(|(index, _)| TagId::from_index(index))
            .collect()
    }

    /// Moves the content out so that a hook can reshape it while reading the rest of the arena.
    pub fn take_content(&mut self, id: TagId) -> TagContent {
        self.get_mut(id)
            .map(|record| std::mem::take(&mut record.content))
            .unwrap_or_default()
    }

    pub fn put_content(&mut self, id: TagId, content: TagContent) {
        if let Some(record) = self.get_mut(id) {
            record.content = content;
        }
    }
}
