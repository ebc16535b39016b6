use crate::checklist::Database;
use log::trace;
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed for `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("stored checklists in slot `{slot}` are malformed: {source}")]
    Parse {
        slot: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode checklists: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// A set of named text slots that outlive the process.
pub trait Storage {
    fn get(&self, slot: &str) -> Result<Option<String>>;
    fn set(&mut self, slot: &str, value: &str) -> Result<()>;
}

/// One `<slot>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl Storage for FileStorage {
    fn get(&self, slot: &str) -> Result<Option<String>> {
        let path = self.slot_path(slot);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&path)(err)),
        }
    }

    fn set(&mut self, slot: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let path = self.slot_path(slot);
        // Write beside the target then rename, so a crash never leaves half a file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io_error(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_error(&path))
    }
}

/// Slots held in memory only; nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get(&self, slot: &str) -> Result<Option<String>> {
        Ok(self.slots.get(slot).cloned())
    }

    fn set(&mut self, slot: &str, value: &str) -> Result<()> {
        self.slots.insert(slot.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads the database out of `slot`. `Ok(None)` means the slot has never been written or holds no text.
pub fn load(storage: &dyn Storage, slot: &str) -> Result<Option<Database>> {
    let Some(data) = storage.get(slot)?.filter(|data| !data.is_empty()) else {
        return Ok(None);
    };
    serde_json::from_str(&data)
        .map(Some)
        .map_err(|source| StorageError::Parse {
            slot: slot.to_string(),
            source,
        })
}

/// Overwrites `slot` with the whole database.
pub fn save(storage: &mut dyn Storage, slot: &str, db: &Database) -> Result<()> {
    let data = serde_json::to_string(db).map_err(StorageError::Encode)?;
    storage.set(slot, &data)?;
    trace!("saved {} lists ({} bytes) to slot `{}`", db.len(), data.len(), slot);
    Ok(())
}
