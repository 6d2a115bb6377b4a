//! services/recorder/src/adapters/local_store.rs
//!
//! A `KeyValueStore` that keeps one file per key inside a directory, so drafts
//! and memos survive a restart of the recorder.
//!
//! Keys are percent-encoded into file names (anything outside `[A-Za-z0-9-_.~]`
//! becomes `%XX`). Writes go to a temporary sibling first and are renamed into
//! place, so a crash mid-write never leaves a half-written value behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use workout_recorder_core::ports::{KeyValueStore, PortError, PortResult};

/// Encoded names only ever put two uppercase hex digits after `%`, so no key
/// can map to a name with this prefix.
const TMP_PREFIX: &str = "%tmp-";

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (and creates, if needed) the storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> PortResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| storage(&dir, e))?;
        debug!("Local store opened at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(&*urlencoding::encode(key))
    }

    fn tmp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{}", TMP_PREFIX, urlencoding::encode(key)))
    }
}

fn storage(path: &Path, e: std::io::Error) -> PortError {
    PortError::Storage(format!("{}: {}", path.display(), e))
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> PortResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage(&path, e)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> PortResult<()> {
        let path = self.path_for(key);
        let tmp = self.tmp_path_for(key);
        fs::write(&tmp, value).map_err(|e| storage(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| storage(&path, e))
    }

    fn remove_item(&self, key: &str) -> PortResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage(&path, e)),
        }
    }

    fn keys(&self) -> PortResult<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| storage(&self.dir, e))?;
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| storage(&self.dir, e))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if name.starts_with(TMP_PREFIX) {
                continue;
            }
            match urlencoding::decode(&name) {
                Ok(key) => keys.push(key.into_owned()),
                Err(e) => debug!("Skipping undecodable file name {}: {}", name, e),
            }
        }
        keys.sort();
        Ok(keys)
    }
}
