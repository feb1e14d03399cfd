//! Durable key-value storage backed by a single JSON file.
//!
//! Values are plain strings, collections are stored as serialized JSON
//! strings. Every write goes through an exclusive lock file and an atomic
//! rename so concurrent invocations never lose each other's updates.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::time::{Duration, Instant, SystemTime};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

pub const KEY_TOKEN: &str = "token";
pub const KEY_ROLE: &str = "role";
pub const KEY_EMAIL: &str = "email";
pub const KEY_USERS: &str = "USERS";

/// Keys cleared on logout.
pub const SESSION_KEYS: &[&str] = &[KEY_TOKEN, KEY_ROLE, KEY_EMAIL];

/// Task snapshots are kept per signed-in subject: the server scopes the task
/// list by caller, and one account's cache must not leak into another's.
pub fn tasks_key(subject: &str) -> String {
    format!("TASKS:{subject}")
}

type Entries = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    pub fn set_many(&self, pairs: &[(&str, &str)]) -> Result<()> {
        self.update(|entries| {
            for (key, value) in pairs {
                entries.insert((*key).to_string(), (*value).to_string());
            }
        })
    }

    pub fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.update(|entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
    }

    /// Read a JSON-encoded value. A value that no longer parses is treated as
    /// absent rather than as an error.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "ignoring unparsable stored value");
                Ok(None)
            }
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }

    fn read_all(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "storage file is corrupt, starting empty");
            Entries::new()
        }))
    }

    /// Read-modify-write under an exclusive lock file.
    fn update(&self, updater: impl FnOnce(&mut Entries)) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let _lock = StorageLock::acquire(self.path.with_extension("json.lock"))?;
        let mut entries = self.read_all()?;
        updater(&mut entries);
        write_atomic(&self.path, &serde_json::to_string_pretty(&entries)?)
    }
}

/// Exclusive writer lock: a sibling file created with `create_new`, removed
/// when the guard drops.
struct StorageLock {
    path: PathBuf,
}

impl StorageLock {
    const RETRY_INTERVAL: Duration = Duration::from_millis(100);
    const MAX_WAIT: Duration = Duration::from_secs(5);
    /// A lock older than this was left by a process that died mid-write.
    const STALE_AFTER: Duration = Duration::from_secs(10);

    fn acquire(path: PathBuf) -> Result<Self> {
        let deadline = Instant::now() + Self::MAX_WAIT;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if lock_age(&path).is_some_and(|age| age > Self::STALE_AFTER) {
                        warn!(path = %path.display(), "removing stale storage lock");
                        let _ = std::fs::remove_file(&path);
                        continue;
                    }
                    if Instant::now() >= deadline {
                        bail!("storage is locked by another process ({})", path.display());
                    }
                    std::thread::sleep(Self::RETRY_INTERVAL);
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("failed to lock {}", path.display()));
                }
            }
        }
    }
}

impl Drop for StorageLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn lock_age(path: &Path) -> Option<Duration> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    SystemTime::now().duration_since(modified).ok()
}

/// Write through a temp file and rename, so readers never see a partial file.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    restrict_permissions(&tmp_path);
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

fn restrict_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
}
