use std::collections::HashMap;

use tagforge_files::ParserError;
use tagforge_files::tag::class::TagClass;
use tagforge_files::tag::file::TagFile;

pub trait RawAssetLoader {
    /// `Ok(None)` when no source provides `path`; errors are reserved for sources that exist but fail to read.
    fn load_raw_owned(&self, path: &str) -> Result<Option<Vec<u8>>, std::io::Error>;
}

/// Relative file path of a tag, e.g. `levels\test\test` + scenario becomes `levels/test/test.scenario`.
pub fn tag_file_path(path: &str, class: TagClass) -> String {
    format!("{}.{}", path.replace('\\', "/"), class.extension())
}

/// Keeps files in memory. Used by tools that generate tags on the fly, and by tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        MemoryLoader::default()
    }

    pub fn insert(&mut self, file_path: &str, bytes: Vec<u8>) {
        self.files.insert(file_path.to_owned(), bytes);
    }

    pub fn insert_tag(&mut self, path: &str, tag: &TagFile) -> Result<(), ParserError> {
        self.insert(&tag_file_path(path, tag.class), tag.to_bytes()?);
        Ok(())
    }

    pub fn contains(&self, file_path: &str) -> bool {
        self.files.contains_key(file_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl RawAssetLoader for MemoryLoader {
    fn load_raw_owned(&self, path: &str) -> Result<Option<Vec<u8>>, std::io::Error> {
        Ok(self.files.get(path).cloned())
    }
}
