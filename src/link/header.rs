use byteorder::{BigEndian, ByteOrder};
use tagforge_files::cache::header::{CACHE_HEADER_SIZE, NAME_SIZE};

use crate::build::error::BuildError;

const SCRAMBLE_FILL: u32 = 0x55555555 | 0xAAAAAAAA;
const SCRAMBLE_KEY_CLEAR: u32 = 0xAEAABEB4;
const SCRAMBLE_KEY_SET: u32 = 0xB9B3BEAF;

/// Map names are stored in a 32-byte NUL terminated field and the game lowercases what it looks up.
pub fn validate_map_name(name: &str) -> Result<(), BuildError> {
    let reason = if name.is_empty() {
        Some("the name is empty")
    } else if name.len() > NAME_SIZE - 1 {
        Some("the name is longer than 31 characters")
    } else if name.chars().any(char::is_uppercase) {
        Some("the name contains uppercase characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(BuildError::InvalidScenarioName {
            name: name.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Scrambles every big endian word after the header, the way legacy `0x1004` caches are stored.
pub fn scramble_legacy(file: &mut [u8]) {
    let Some(body) = file.get_mut(CACHE_HEADER_SIZE..) else {
        return;
    };

    for word in body.chunks_exact_mut(4) {
        let original = BigEndian::read_u32(word);
        let key = if original & 0x1004 == 0 {
            SCRAMBLE_KEY_CLEAR
        } else {
            SCRAMBLE_KEY_SET
        };
        BigEndian::write_u32(word, (original | SCRAMBLE_FILL) ^ key);
    }
}
