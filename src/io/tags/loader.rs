use std::fs;
use std::path::PathBuf;

use itertools::Itertools;
use log::{debug, trace};

use crate::io::common::loader::RawAssetLoader;

/// Reads tags from a list of directories. Earlier directories take precedence over later ones, so a
/// modded tag shadows the stock one of the same path.
pub struct TagDirectoryLoader {
    prioritized_directories: Vec<PathBuf>,
}

impl TagDirectoryLoader {
    pub fn new<P: Into<PathBuf>>(directories: impl IntoIterator<Item = P>) -> Result<Self, std::io::Error> {
        let prioritized_directories = directories.into_iter().map(Into::into).collect_vec();

        if let Some(missing) = prioritized_directories.iter().find(|dir| !dir.is_dir()) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Tags directory {} does not exist", missing.display()),
            ));
        }

        Ok(TagDirectoryLoader {
            prioritized_directories,
        })
    }
}

impl RawAssetLoader for TagDirectoryLoader {
    fn load_raw_owned(&self, path: &str) -> Result<Option<Vec<u8>>, std::io::Error> {
        let Some(file) = self
            .prioritized_directories
            .iter()
            .map(|dir| dir.join(path))
            .find(|file| file.is_file())
        else {
            debug!("Could not locate {} in any tags directory", path);
            return Ok(None);
        };

        trace!("Loading {} from {}", path, file.display());
        fs::read(&file).map(Some)
    }
}
