use std::io::Read;
use std::path::{Path, PathBuf};

use super::{Error, Result, StorePersister};
use crate::fsutil;
use crate::store::HostValueStore;

/// Keeps the value store of one host in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFilePersister {
    path: PathBuf,
}

impl JsonFilePersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl StorePersister for JsonFilePersister {
    fn load(&self) -> Result<HostValueStore> {
        let mut reader = match fsutil::open_file_reader(&self.path) {
            Ok(reader) => reader,
            Err(err) if err.is_not_found() => {
                log::debug!(
                    target: "persistence",
                    "no value store at {}, starting empty",
                    self.path.display()
                );
                return Ok(HostValueStore::new());
            }
            Err(err) => return Err(err.into()),
        };

        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|source| Error::Read {
                path: self.path.clone(),
                source,
            })?;
        let store: HostValueStore =
            serde_json::from_str(&content).map_err(|source| Error::Decode {
                path: self.path.clone(),
                source,
            })?;
        log::debug!(
            target: "persistence",
            "loaded value store of {} items from {}",
            store.len(),
            self.path.display()
        );
        Ok(store)
    }

    /// Writes to a temporary file next to the target first, so an interrupted write
    /// leaves the previous state intact.
    fn persist(&self, store: &HostValueStore) -> Result<()> {
        let content = serde_json::to_string(store).map_err(Error::Encode)?;
        let temp_path = self.temp_path();
        std::fs::write(&temp_path, content).map_err(|source| Error::Write {
            path: temp_path.clone(),
            source,
        })?;
        std::fs::rename(&temp_path, &self.path).map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })?;
        log::trace!(target: "persistence", "persisted value store to {}", self.path.display());
        Ok(())
    }
}
