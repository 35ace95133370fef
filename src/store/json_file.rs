use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::app::{NectarError, Result};
use crate::store::KvStore;

/// Bumped whenever the on-disk record shape changes. Files with another
/// version load as an empty cache.
pub const CACHE_VERSION: u32 = 1;

#[derive(Deserialize)]
struct CacheFile<V> {
    version: u32,
    entries: BTreeMap<String, V>,
}

#[derive(Serialize)]
struct CacheFileRef<'a, V> {
    version: u32,
    entries: &'a BTreeMap<String, V>,
}

/// A key-value cache held in memory and mirrored to one JSON file.
///
/// The file is read fully once at construction and rewritten fully on
/// every `put`. Any read or parse failure degrades to an empty cache.
pub struct JsonFileStore<V> {
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, V>>,
}

impl<V> JsonFileStore<V>
where
    V: Serialize + DeserializeOwned + Clone,
{
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = Self::load(&path);
        tracing::debug!("Loaded {} cache entries from {}", entries.len(), path.display());

        Self {
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn load(path: &Path) -> BTreeMap<String, V> {
        if !path.exists() {
            return BTreeMap::new();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Cache {} unreadable, starting empty: {}", path.display(), e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str::<CacheFile<V>>(&content) {
            Ok(file) if file.version == CACHE_VERSION => file.entries,
            Ok(file) => {
                tracing::warn!(
                    "Cache {} has version {}, expected {}; starting empty",
                    path.display(),
                    file.version,
                    CACHE_VERSION
                );
                BTreeMap::new()
            }
            Err(e) => {
                tracing::warn!("Cache {} is corrupt, starting empty: {}", path.display(), e);
                BTreeMap::new()
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, V>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write(path: &Path, entries: &BTreeMap<String, V>) -> Result<()> {
        let body = serde_json::to_string_pretty(&CacheFileRef {
            version: CACHE_VERSION,
            entries,
        })?;
        write_atomic(path, &body)
    }
}

/// Replace `path` with `body` via a sibling temp file and a rename.
pub(crate) fn write_atomic(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        NectarError::Io(e)
    })
}

impl<V> KvStore<V> for JsonFileStore<V>
where
    V: Serialize + DeserializeOwned + Clone,
{
    fn get(&self, key: &str) -> Option<V> {
        self.lock().get(key).cloned()
    }

    fn put(&self, key: &str, value: V) {
        let mut entries = self.lock();
        entries.insert(key.to_string(), value);

        if let Some(path) = &self.path {
            if let Err(e) = Self::write(path, &entries) {
                tracing::warn!("Could not save cache {}: {}", path.display(), e);
            }
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn flush(&self) -> Result<()> {
        match &self.path {
            Some(path) => Self::write(path, &self.lock()),
            None => Ok(()),
        }
    }
}
