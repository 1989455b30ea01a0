//! # Client storage
//!
//! A string key-value store holding JSON documents, the way a browser's local storage would.
//! Reads are forgiving: anything missing or unreadable falls back to a default. Writes report failure,
//! and a failed write never touches what is already in memory.

pub mod records;

use hashbrown::HashMap;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage quota exceeded: {needed} needed of {quota}")]
    QuotaExceeded { needed: String, quota: String },
    #[error("invalid key `{0}`")]
    InvalidKey(String),
    #[error("serializing `{key}`: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Read and parse a JSON document, or `fallback` if that fails for any reason.
pub fn load_or<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
    fallback: T,
) -> T {
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("stored `{key}` is unreadable, using default: {e}");
                fallback
            }
        },
        Ok(None) => fallback,
        Err(e) => {
            log::warn!("reading `{key}`: {e}");
            fallback
        }
    }
}

/// Serialize and write a JSON document.
pub fn save<T: serde::Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_owned(),
        source,
    })?;
    store.set(key, raw)
}

fn check_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}

#[allow(clippy::cast_precision_loss)]
fn bytes(count: usize) -> String {
    human_bytes::human_bytes(count as f64)
}

/// Store kept in memory, with an optional quota on the total size of keys and values.
#[derive(Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}
impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }
    /// Total bytes of keys and values stored.
    #[must_use]
    pub fn used(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        Ok(self.entries.get(key).cloned())
    }
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        check_key(key)?;
        if let Some(quota) = self.quota {
            let replaced = self.entries.get(key).map_or(0, |old| key.len() + old.len());
            let needed = self.used() - replaced + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    needed: bytes(needed),
                    quota: bytes(quota),
                });
            }
        }
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }
    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        self.entries.remove(key);
        Ok(())
    }
}

/// Store keeping one `<key>.json` file per entry in a directory.
pub struct DirectoryStore {
    root: std::path::PathBuf,
}
impl DirectoryStore {
    /// Use `root`, creating it if needed.
    pub fn open(root: impl Into<std::path::PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }
    /// The per-user data directory for this program, if the platform has one.
    #[must_use]
    pub fn default_location(program: &str) -> Option<std::path::PathBuf> {
        let mut dir = dirs::data_dir()?;
        dir.push(program);
        Some(dir)
    }
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
    fn path(&self, key: &str) -> Result<std::path::PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}
impl KeyValueStore for DirectoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path(key)?) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        let path = self.path(key)?;
        // Write aside and rename, so a failed write leaves the old value intact.
        let temp = path.with_extension("json.partial");
        std::fs::write(&temp, value)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }
    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fallback_on_missing_or_garbage() {
        let mut store = MemoryStore::new();
        assert_eq!(load_or(&store, "colors", vec![1u8]), vec![1]);
        store.set("colors", "{nope".into()).unwrap();
        assert_eq!(load_or(&store, "colors", vec![2u8]), vec![2]);
        save(&mut store, "colors", &[3u8, 4]).unwrap();
        assert_eq!(load_or(&store, "colors", Vec::<u8>::new()), vec![3, 4]);
    }
    #[test]
    fn quota_rejects_without_losing_data() {
        let mut store = MemoryStore::with_quota(32);
        save(&mut store, "a", "small").unwrap();
        let err = save(&mut store, "a", &"x".repeat(64)).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(load_or(&store, "a", String::new()), "small");
        // Replacing a value only counts the difference.
        save(&mut store, "a", &"y".repeat(20)).unwrap();
    }
    #[test]
    fn keys_are_validated() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.set("../etc", String::new()),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(store.get("").is_err());
    }
    #[test]
    fn directory_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::open(dir.path().join("nested")).unwrap();
        assert_eq!(store.get("ultra_ware_v3").unwrap(), None);
        save(&mut store, "ultra_ware_v3", &["line"]).unwrap();
        assert_eq!(
            load_or(&store, "ultra_ware_v3", Vec::<String>::new()),
            ["line"]
        );
        store.remove("ultra_ware_v3").unwrap();
        store.remove("ultra_ware_v3").unwrap();
        assert_eq!(store.get("ultra_ware_v3").unwrap(), None);
    }
}
