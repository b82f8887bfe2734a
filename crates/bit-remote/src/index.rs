use crate::RemoteError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest exported state of one component in a scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexEntry {
    pub version: String,
    /// blake3 of the manifest blob.
    pub checksum: String,
    /// Source basename -> blake3 of its content (the source blob key).
    #[serde(default)]
    pub sources: BTreeMap<String, String>,
    pub exported_at: String,
}

/// The scope index: maps `box/name` keys to their latest export.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopeIndex {
    pub entries: BTreeMap<String, IndexEntry>,
}

impl ScopeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, RemoteError> {
        serde_json::from_slice(data)
            .map_err(|e| RemoteError::Serialization(format!("invalid scope index: {e}")))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, RemoteError> {
        serde_json::to_vec_pretty(self).map_err(|e| RemoteError::Serialization(e.to_string()))
    }

    /// Insert or replace the entry for `box/name`.
    pub fn publish(&mut self, key: &str, entry: IndexEntry) {
        self.entries.insert(key.to_owned(), entry);
    }

    pub fn lookup(&self, key: &str) -> Option<&IndexEntry> {
        self.entries.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(version: &str) -> IndexEntry {
        IndexEntry {
            version: version.to_owned(),
            checksum: "c0ffee".to_owned(),
            sources: BTreeMap::new(),
            exported_at: "2026-01-01T00:00:00Z".to_owned(),
        }
    }

    #[test]
    fn index_roundtrip() {
        let mut index = ScopeIndex::new();
        index.publish("utils/string", entry("1"));
        let bytes = index.to_bytes().unwrap();
        assert_eq!(ScopeIndex::from_bytes(&bytes).unwrap(), index);
    }

    #[test]
    fn publish_replaces_previous_version() {
        let mut index = ScopeIndex::new();
        index.publish("utils/string", entry("1"));
        index.publish("utils/string", entry("2"));
        assert_eq!(index.entries.len(), 1);
        assert_eq!(index.lookup("utils/string").unwrap().version, "2");
        assert!(index.lookup("utils/number").is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            ScopeIndex::from_bytes(b"not json"),
            Err(RemoteError::Serialization(_))
        ));
    }
}
