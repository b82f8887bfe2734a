use crate::{BlobKind, RemoteError, ScopeBackend};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const INDEX_FILE: &str = "index.json";

/// Scope stored in a plain directory:
///
/// ```text
/// <root>/index.json
/// <root>/manifests/<box>/<name>/<version>
/// <root>/sources/<blake3>
/// ```
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, kind: BlobKind, key: &str) -> Result<PathBuf, RemoteError> {
        if key.is_empty() || key.split('/').any(|seg| seg.is_empty() || seg == "..") {
            return Err(RemoteError::Serialization(format!("invalid blob key '{key}'")));
        }
        Ok(self.root.join(kind.dir_name()).join(key))
    }

    fn write_atomic(path: &Path, data: &[u8]) -> Result<(), RemoteError> {
        let dir = path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| RemoteError::Io(e.error))?;
        Ok(())
    }

    fn read(path: &Path, what: &str) -> Result<Vec<u8>, RemoteError> {
        match fs::read(path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(RemoteError::NotFound(what.to_owned())),
            Err(e) => Err(e.into()),
        }
    }
}

impl ScopeBackend for FsBackend {
    fn put_blob(&self, kind: BlobKind, key: &str, data: &[u8]) -> Result<(), RemoteError> {
        let path = self.blob_path(kind, key)?;
        tracing::debug!("write {} ({} bytes)", path.display(), data.len());
        Self::write_atomic(&path, data)
    }

    fn get_blob(&self, kind: BlobKind, key: &str) -> Result<Vec<u8>, RemoteError> {
        let path = self.blob_path(kind, key)?;
        tracing::debug!("read {}", path.display());
        Self::read(&path, key)
    }

    fn has_blob(&self, kind: BlobKind, key: &str) -> Result<bool, RemoteError> {
        Ok(self.blob_path(kind, key)?.is_file())
    }

    fn put_index(&self, data: &[u8]) -> Result<(), RemoteError> {
        Self::write_atomic(&self.root.join(INDEX_FILE), data)
    }

    fn get_index(&self) -> Result<Vec<u8>, RemoteError> {
        Self::read(&self.root.join(INDEX_FILE), "scope index")
    }
}
