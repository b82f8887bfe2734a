//! Remote scopes for sharing bit components.
//!
//! This crate provides the `ScopeBackend` abstraction over a remote scope's
//! blob storage, a filesystem and an HTTP implementation, the scope index
//! mapping `box/name` to the latest exported version, and the push/fetch
//! operations used by export.

pub mod fs;
pub mod http;
pub mod index;
pub mod transfer;

pub use fs::FsBackend;
pub use http::HttpBackend;
pub use index::{IndexEntry, ScopeIndex};
pub use transfer::{
    fetch_manifest, load_index, push_component, ComponentBundle, PushResult, SourceFile,
};

use bit_schema::{ManifestError, Remote, RemoteLocation};
use std::path::Path;
use thiserror::Error;

/// Protocol version sent as `X-Bit-Protocol` header on all HTTP requests.
pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("not found in scope: {0}")]
    NotFound(String),
    #[error("remote scope '{0}' is not configured")]
    UnknownRemote(String),
    #[error("remote manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("integrity failure for '{key}': expected {expected}, got {actual}")]
    IntegrityFailure {
        key: String,
        expected: String,
        actual: String,
    },
}

/// Kind of blob held by a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    /// A component's `bit.json`, keyed `box/name/version`.
    Manifest,
    /// A source file, keyed by its blake3 hash.
    Source,
}

impl BlobKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Manifest => "manifests",
            Self::Source => "sources",
        }
    }
}

/// Storage operations of a remote scope.
pub trait ScopeBackend: Send + Sync {
    fn put_blob(&self, kind: BlobKind, key: &str, data: &[u8]) -> Result<(), RemoteError>;

    fn get_blob(&self, kind: BlobKind, key: &str) -> Result<Vec<u8>, RemoteError>;

    fn has_blob(&self, kind: BlobKind, key: &str) -> Result<bool, RemoteError>;

    fn put_index(&self, data: &[u8]) -> Result<(), RemoteError>;

    fn get_index(&self) -> Result<Vec<u8>, RemoteError>;
}

/// Open the backend for a remote. Relative filesystem locations resolve
/// against `base_dir`.
pub fn open_backend(remote: &Remote, base_dir: &Path) -> Box<dyn ScopeBackend> {
    match &remote.location {
        RemoteLocation::Filesystem(path) => Box::new(FsBackend::new(base_dir.join(path))),
        RemoteLocation::Http(url) => Box::new(HttpBackend::new(url)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_kind_dirs() {
        assert_eq!(BlobKind::Manifest.dir_name(), "manifests");
        assert_eq!(BlobKind::Source.dir_name(), "sources");
    }

    #[test]
    fn open_backend_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Remote::new("local", "scopes/local");
        let backend = open_backend(&remote, dir.path());
        backend.put_blob(BlobKind::Source, "abc", b"x").unwrap();
        assert!(dir.path().join("scopes/local/sources/abc").is_file());
    }
}
