use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use sieve_core::StateStore;

use crate::persist::{ensure_parent_dir, write_atomic, PersistError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// No state file yet; first run.
    Fresh,
    Loaded,
    /// The file was unreadable or malformed and an empty store replaced it.
    Recovered { reason: String },
}

/// Reads the persisted store. Never fails: anything unusable yields an empty store.
pub fn load_store(path: &Path) -> (StateStore, LoadStatus) {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return (StateStore::new(), LoadStatus::Fresh);
        }
        Err(err) => {
            engine_warn!("Failed to read state from {:?}: {}; starting empty", path, err);
            return (
                StateStore::new(),
                LoadStatus::Recovered {
                    reason: err.to_string(),
                },
            );
        }
    };

    match ron::from_str::<StateStore>(&content) {
        Ok(store) => {
            engine_info!(
                "Loaded state from {:?}: run_seq={} records={}",
                path,
                store.run_seq(),
                store.len()
            );
            (store, LoadStatus::Loaded)
        }
        Err(err) => {
            engine_warn!("Failed to parse state from {:?}: {}; starting empty", path, err);
            (
                StateStore::new(),
                LoadStatus::Recovered {
                    reason: err.to_string(),
                },
            )
        }
    }
}

pub fn encode_store(store: &StateStore) -> Result<String, PersistError> {
    let pretty = ron::ser::PrettyConfig::new();
    ron::ser::to_string_pretty(store, pretty).map_err(|err| PersistError::Serialize(err.to_string()))
}

pub fn save_store(path: &Path, store: &StateStore) -> Result<(), PersistError> {
    let content = encode_store(store)?;
    write_atomic(path, &content)
}

/// Exclusive ownership of the state file for the duration of one run.
///
/// Holds an OS lock on `<state>.lock`; the lock is released when the session
/// is dropped, on every exit path.
pub struct StateSession {
    path: PathBuf,
    lock: File,
    store: StateStore,
    status: LoadStatus,
}

impl StateSession {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let path = path.into();
        ensure_parent_dir(&path)?;

        let lock_path = lock_path_for(&path);
        let lock = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)?;
        fs2::FileExt::try_lock_exclusive(&lock).map_err(|err| PersistError::Locked {
            path: path.clone(),
            message: err.to_string(),
        })?;

        let (store, status) = load_store(&path);
        Ok(Self {
            path,
            lock,
            store,
            status,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Moves the store out for a run; hand it back through [`StateSession::commit`].
    pub fn take_store(&mut self) -> StateStore {
        std::mem::take(&mut self.store)
    }

    /// Persists the whole store atomically and keeps it as the session's copy.
    pub fn commit(&mut self, store: StateStore) -> Result<(), PersistError> {
        save_store(&self.path, &store)?;
        self.store = store;
        Ok(())
    }
}

impl Drop for StateSession {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.lock);
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "state".into());
    name.push(".lock");
    path.with_file_name(name)
}
