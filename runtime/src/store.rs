//! Durable key-value state with silent degradation.
//!
//! Hosts persist small JSON blobs (session snapshots, play preferences)
//! under string keys. Storage being unavailable is never an error the user
//! sees: writes are dropped, reads come back empty, and the runtime keeps
//! working in-memory for the life of the process.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

pub trait StateStore {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// Process-lifetime storage: the fallback when no durable backend exists,
/// and the test double.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// One file per key under a base directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    base: PathBuf,
}

impl JsonFileStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// `QUIZBOARD_STATE_PATH`, else `$XDG_CONFIG_HOME/quizboard/state`,
    /// else `$HOME/.config/quizboard/state`, else the working directory.
    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("QUIZBOARD_STATE_PATH") {
            return Self::new(PathBuf::from(explicit));
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("quizboard");
        path.push("state");
        Self::new(path)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are runtime-generated identifiers; anything path-hostile is
        // flattened rather than rejected.
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base.join(format!("{safe}.json"))
    }
}

impl StateStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        let raw = fs::read_to_string(self.path_for(key)).ok()?;
        // A file that rotted on disk reads as absent, not as an error.
        serde_json::from_str::<serde_json::Value>(&raw).ok()?;
        Some(raw)
    }

    fn put(&mut self, key: &str, value: &str) {
        if fs::create_dir_all(&self.base).is_err() {
            return;
        }
        let _ = fs::write(self.path_for(key), value);
    }

    fn remove(&mut self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }
}

/// The fixed storage key unique to a generated document: a digest of the
/// title and cell payload, so re-exporting the same quiz keeps the same
/// key while distinct documents get distinct ones.
pub fn document_key(title: &str, payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update([0]);
    hasher.update(payload.as_bytes());
    let digest = hasher.finalize();
    format!("game-{}", hex::encode(&digest[..4]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.put("k", "{\"v\":1}");
        assert_eq!(store.get("k").as_deref(), Some("{\"v\":1}"));
        store.remove("k");
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn file_store_degrades_silently_on_bad_base() {
        let mut store = JsonFileStore::new("/dev/null/not-a-dir");
        store.put("k", "v");
        assert_eq!(store.get("k"), None);
        store.remove("k");
    }

    #[test]
    fn file_store_treats_rotten_payloads_as_absent() {
        let base = std::env::temp_dir().join(format!("quizboard-store-{}", std::process::id()));
        let _ = fs::remove_dir_all(&base);
        let mut store = JsonFileStore::new(&base);

        store.put("good", "{\"teams\":[]}");
        assert_eq!(store.get("good").as_deref(), Some("{\"teams\":[]}"));

        store.put("bad", "{definitely not json");
        assert_eq!(store.get("bad"), None);

        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn document_key_is_deterministic_and_distinct() {
        let a = document_key("Quizmas", "payload");
        let b = document_key("Quizmas", "payload");
        let c = document_key("Quizmas", "other");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("game-"));
        assert_eq!(a.len(), "game-".len() + 8);
    }

    #[test]
    fn hostile_keys_flatten_to_safe_filenames() {
        let store = JsonFileStore::new("/tmp/quizboard-test-keys");
        let path = store.path_for("../../etc/passwd");
        assert!(path.starts_with("/tmp/quizboard-test-keys"));
        assert!(!path.to_string_lossy().contains(".."));
    }
}
