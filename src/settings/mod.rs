use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SETTINGS_FALLBACK_NAME: &str = "settings.json";

/// Profile identifier every settings read and write is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i32);

impl UserId {
    pub const SYSTEM: UserId = UserId(0);
}

impl Default for UserId {
    fn default() -> Self {
        Self::SYSTEM
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings store: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write settings store: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings store: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to lock settings store: {path}")]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize settings store")]
    Serialize(#[source] serde_json::Error),
    #[error("settings store lock poisoned")]
    Poisoned,
}

pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

/// String-valued key/value store shared by every component of a profile.
///
/// Integers are stored as their decimal string form, so a value written with
/// [`SettingsStore::put_int`] reads back through [`SettingsStore::get_string`]
/// and vice versa. The store offers last-writer-wins only; callers doing
/// read-modify-write cycles race with other writers.
pub trait SettingsStore: Send + Sync {
    fn get_string(&self, key: &str, user: UserId) -> SettingsResult<Option<String>>;
    fn put_string(&self, key: &str, value: &str, user: UserId) -> SettingsResult<()>;

    /// Missing and non-numeric values both resolve to `default`.
    fn get_int(&self, key: &str, default: i32, user: UserId) -> SettingsResult<i32> {
        Ok(self
            .get_string(key, user)?
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .unwrap_or(default))
    }

    fn put_int(&self, key: &str, value: i32, user: UserId) -> SettingsResult<()> {
        self.put_string(key, &value.to_string(), user)
    }
}

/// In-process store, mostly useful for hosts that bridge their own storage
/// and for tests.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<(UserId, String), String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().map_or(0, |values| values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SettingsStore for MemorySettings {
    fn get_string(&self, key: &str, user: UserId) -> SettingsResult<Option<String>> {
        let values = self.values.lock().map_err(|_| SettingsError::Poisoned)?;
        Ok(values.get(&(user, key.to_string())).cloned())
    }

    fn put_string(&self, key: &str, value: &str, user: UserId) -> SettingsResult<()> {
        let mut values = self.values.lock().map_err(|_| SettingsError::Poisoned)?;
        values.insert((user, key.to_string()), value.to_string());
        Ok(())
    }
}

type StoreContents = BTreeMap<String, BTreeMap<String, String>>;

/// JSON file store laid out as `{ "<user>": { "<key>": "<value>" } }`.
///
/// Any number of handles, in this process or others, may share a path.
/// Writers hold an exclusive lock on a `<file>.lock` sibling across the whole
/// load-modify-save cycle, and the file is replaced by rename, so readers
/// never see a partial document and one key's writer never drops another's.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from(SETTINGS_FALLBACK_NAME));
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn create_parent(&self) -> SettingsResult<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                    path: self.path.clone(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }

    /// Blocks until no other handle is writing. Released when the file drops.
    fn lock_exclusive(&self) -> SettingsResult<File> {
        self.create_parent()?;
        let lock_path = self.sibling(".lock");
        let lock_error = |source: io::Error| SettingsError::Lock {
            path: lock_path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(lock_error)?;
        file.lock().map_err(lock_error)?;
        Ok(file)
    }

    fn load(&self) -> SettingsResult<StoreContents> {
        let serialized = match fs::read_to_string(&self.path) {
            Ok(serialized) => serialized,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(StoreContents::new()),
            Err(source) => {
                return Err(SettingsError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if serialized.trim().is_empty() {
            return Ok(StoreContents::new());
        }
        serde_json::from_str(&serialized).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Temp file then rename; callers hold the exclusive lock.
    fn save(&self, contents: &StoreContents) -> SettingsResult<()> {
        let serialized =
            serde_json::to_string_pretty(contents).map_err(SettingsError::Serialize)?;
        let temp = self.sibling(".tmp");
        let write_error = |source: io::Error| SettingsError::Write {
            path: self.path.clone(),
            source,
        };
        fs::write(&temp, serialized).map_err(write_error)?;
        fs::rename(&temp, &self.path).map_err(|source| {
            let _ = fs::remove_file(&temp);
            write_error(source)
        })
    }
}

impl SettingsStore for FileSettingsStore {
    fn get_string(&self, key: &str, user: UserId) -> SettingsResult<Option<String>> {
        let contents = self.load()?;
        Ok(contents
            .get(&user.to_string())
            .and_then(|values| values.get(key))
            .cloned())
    }

    fn put_string(&self, key: &str, value: &str, user: UserId) -> SettingsResult<()> {
        let _lock = self.lock_exclusive()?;
        let mut contents = self.load()?;
        contents
            .entry(user.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.save(&contents)?;
        tracing::trace!(key, %user, path = %self.path.display(), "settings value written");
        Ok(())
    }
}
