use crate::{BlobKind, IndexEntry, RemoteError, ScopeBackend, ScopeIndex};
use bit_schema::{BitId, ComponentManifest};
use std::collections::BTreeMap;

/// A source file to upload alongside a manifest.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub basename: String,
    pub content: Vec<u8>,
}

/// Everything needed to export one component.
#[derive(Debug, Clone)]
pub struct ComponentBundle {
    pub id: BitId,
    pub manifest: ComponentManifest,
    pub files: Vec<SourceFile>,
}

/// Result of a push operation.
#[derive(Debug)]
pub struct PushResult {
    pub id: BitId,
    pub sources_pushed: usize,
    pub sources_skipped: usize,
}

fn manifest_key(id: &BitId, version: &str) -> String {
    format!("{}/{version}", id.box_and_name())
}

/// Read the scope index; a scope that has never been written to has an
/// empty one.
pub fn load_index(backend: &dyn ScopeBackend) -> Result<ScopeIndex, RemoteError> {
    match backend.get_index() {
        Ok(data) => ScopeIndex::from_bytes(&data),
        Err(RemoteError::NotFound(_)) => Ok(ScopeIndex::new()),
        Err(e) => Err(e),
    }
}

/// Push a component (sources, then manifest, then index entry) to a scope.
///
/// Sources are content-addressed and skipped when already present.
pub fn push_component(
    backend: &dyn ScopeBackend,
    bundle: &ComponentBundle,
) -> Result<PushResult, RemoteError> {
    let manifest_text = bundle.manifest.to_text(true)?;

    let mut sources = BTreeMap::new();
    let mut sources_pushed = 0;
    let mut sources_skipped = 0;
    for file in &bundle.files {
        let hash = blake3::hash(&file.content).to_hex().to_string();
        if backend.has_blob(BlobKind::Source, &hash)? {
            sources_skipped += 1;
        } else {
            backend.put_blob(BlobKind::Source, &hash, &file.content)?;
            sources_pushed += 1;
        }
        sources.insert(file.basename.clone(), hash);
    }

    let key = manifest_key(&bundle.id, &bundle.manifest.version);
    backend.put_blob(BlobKind::Manifest, &key, manifest_text.as_bytes())?;

    let mut index = load_index(backend)?;
    index.publish(
        &bundle.id.box_and_name(),
        IndexEntry {
            version: bundle.manifest.version.clone(),
            checksum: blake3::hash(manifest_text.as_bytes()).to_hex().to_string(),
            sources,
            exported_at: chrono::Utc::now().to_rfc3339(),
        },
    );
    backend.put_index(&index.to_bytes()?)?;

    Ok(PushResult {
        id: bundle.id.clone(),
        sources_pushed,
        sources_skipped,
    })
}

/// Fetch the latest exported manifest of `id` from a scope, verifying it
/// against the checksum recorded in the index.
pub fn fetch_manifest(
    backend: &dyn ScopeBackend,
    id: &BitId,
) -> Result<ComponentManifest, RemoteError> {
    let index = load_index(backend)?;
    let entry = index
        .lookup(&id.box_and_name())
        .ok_or_else(|| RemoteError::NotFound(id.box_and_name()))?;

    let key = manifest_key(id, &entry.version);
    let data = backend.get_blob(BlobKind::Manifest, &key)?;
    let actual = blake3::hash(&data).to_hex().to_string();
    if actual != entry.checksum {
        return Err(RemoteError::IntegrityFailure {
            key,
            expected: entry.checksum.clone(),
            actual,
        });
    }

    let raw: serde_json::Value = serde_json::from_slice(&data)
        .map_err(|e| RemoteError::Serialization(format!("invalid manifest: {e}")))?;
    Ok(ComponentManifest::load_from_raw(raw)?)
}
