use crate::constants::{
    BIT_JSON, DEFAULT_BIT_NAME, DEFAULT_BIT_VERSION, DEFAULT_BOX_NAME, DEFAULT_COMPILER,
    DEFAULT_TESTER, IMPL_FILE_NAME, SPEC_FILE_NAME,
};
use crate::id::{BitIds, IdError};
use crate::remote::Remotes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("manifest already exists at {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("failed to read or write manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to serialize manifest: {0}")]
    Serialize(String),
}

/// Partial `sources` section as it may appear in input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesProps {
    #[serde(default, rename = "impl")]
    pub impl_file: Option<String>,
    #[serde(default)]
    pub spec: Option<String>,
}

/// Partial `env` section as it may appear in input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvProps {
    #[serde(default)]
    pub compiler: Option<String>,
    #[serde(default)]
    pub tester: Option<String>,
}

/// A partial manifest. Every field may be missing; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestProps {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "box")]
    pub box_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub sources: Option<SourcesProps>,
    #[serde(default)]
    pub env: Option<EnvProps>,
    #[serde(default)]
    pub dependencies: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub remotes: Option<BTreeMap<String, String>>,
}

/// Basenames of a component's source files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sources {
    #[serde(rename = "impl")]
    pub impl_file: String,
    pub spec: String,
}

/// Build and test environment ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Env {
    pub compiler: String,
    pub tester: String,
}

/// The serialization-ready projection of a manifest; this is the exact
/// shape of `bit.json` on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainManifest {
    pub name: String,
    #[serde(rename = "box")]
    pub box_name: String,
    pub version: String,
    pub sources: Sources,
    pub env: Env,
    pub remotes: BTreeMap<String, String>,
    pub dependencies: BTreeMap<String, String>,
}

/// A component manifest (`bit.json`) with every field resolved.
///
/// Deserializing goes through [`ManifestProps`], so a manifest read from any
/// source gets the same default-filling as [`ComponentManifest::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ManifestProps", into = "PlainManifest")]
pub struct ComponentManifest {
    pub name: String,
    pub box_name: String,
    pub version: String,
    pub sources: Sources,
    pub env: Env,
    pub dependencies: BTreeMap<String, String>,
    pub remotes: BTreeMap<String, String>,
}

/// Empty strings count as missing.
fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

impl From<ManifestProps> for ComponentManifest {
    fn from(props: ManifestProps) -> Self {
        let sources = props.sources.unwrap_or_default();
        let env = props.env.unwrap_or_default();
        Self {
            name: or_default(props.name, DEFAULT_BIT_NAME),
            box_name: or_default(props.box_name, DEFAULT_BOX_NAME),
            version: or_default(props.version, DEFAULT_BIT_VERSION),
            sources: Sources {
                impl_file: or_default(sources.impl_file, IMPL_FILE_NAME),
                spec: or_default(sources.spec, SPEC_FILE_NAME),
            },
            env: Env {
                compiler: or_default(env.compiler, DEFAULT_COMPILER),
                tester: or_default(env.tester, DEFAULT_TESTER),
            },
            dependencies: props.dependencies.unwrap_or_default(),
            remotes: props.remotes.unwrap_or_default(),
        }
    }
}

impl From<ComponentManifest> for PlainManifest {
    fn from(manifest: ComponentManifest) -> Self {
        manifest.to_plain_object()
    }
}

impl Default for ComponentManifest {
    fn default() -> Self {
        Self::new(ManifestProps::default())
    }
}

impl ComponentManifest {
    pub fn new(props: ManifestProps) -> Self {
        props.into()
    }

    /// Path of the manifest file inside `dir`.
    pub fn path_in(dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(BIT_JSON)
    }

    pub fn impl_basename(&self) -> &str {
        &self.sources.impl_file
    }

    pub fn spec_basename(&self) -> &str {
        &self.sources.spec
    }

    pub fn compiler_name(&self) -> &str {
        &self.env.compiler
    }

    pub fn tester_name(&self) -> &str {
        &self.env.tester
    }

    /// Insert or overwrite the constraint for `id`.
    pub fn add_dependency(&mut self, id: &str, version: &str) {
        self.dependencies.insert(id.to_owned(), version.to_owned());
    }

    pub fn remove_dependency(&mut self, id: &str) {
        self.dependencies.remove(id);
    }

    /// An empty constraint reads as "no dependency".
    pub fn has_dependency(&self, id: &str) -> bool {
        self.dependencies.get(id).is_some_and(|v| !v.is_empty())
    }

    pub fn add_remote(&mut self, name: &str, location: &str) {
        self.remotes.insert(name.to_owned(), location.to_owned());
    }

    pub fn remove_remote(&mut self, name: &str) {
        self.remotes.remove(name);
    }

    pub fn get_dependencies(&self) -> Result<BitIds, IdError> {
        BitIds::from_dependencies(&self.dependencies)
    }

    pub fn get_remotes(&self) -> Remotes {
        Remotes::load(&self.remotes)
    }

    /// Structural check: every scalar field is present and non-empty.
    pub fn validate(&self) -> bool {
        [
            &self.name,
            &self.box_name,
            &self.version,
            &self.sources.impl_file,
            &self.sources.spec,
            &self.env.compiler,
            &self.env.tester,
        ]
        .iter()
        .all(|field| !field.is_empty())
    }

    pub fn to_plain_object(&self) -> PlainManifest {
        PlainManifest {
            name: self.name.clone(),
            box_name: self.box_name.clone(),
            version: self.version.clone(),
            sources: self.sources.clone(),
            env: self.env.clone(),
            remotes: self.get_remotes().to_plain_object(),
            dependencies: self.dependencies.clone(),
        }
    }

    /// Render as JSON. `pretty` indents with four spaces.
    pub fn to_text(&self, pretty: bool) -> Result<String, ManifestError> {
        let plain = self.to_plain_object();
        if !pretty {
            return serde_json::to_string(&plain)
                .map_err(|e| ManifestError::Serialize(e.to_string()));
        }
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        plain
            .serialize(&mut ser)
            .map_err(|e| ManifestError::Serialize(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| ManifestError::Serialize(e.to_string()))
    }

    /// Build a manifest from an already-parsed JSON document, e.g. one
    /// fetched from a remote scope.
    pub fn load_from_raw(raw: serde_json::Value) -> Result<Self, ManifestError> {
        let props: ManifestProps = serde_json::from_value(raw)?;
        Ok(props.into())
    }

    /// Read `dir/bit.json`. Blocks on filesystem I/O.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = Self::path_in(dir);
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ManifestError::NotFound(path));
            }
            Err(e) => return Err(e.into()),
        };
        debug!("loaded manifest {}", path.display());
        // Encoding errors surface as parse failures, not I/O.
        Ok(serde_json::from_slice(&content)?)
    }

    /// Write `dir/bit.json` atomically. Blocks on filesystem I/O.
    ///
    /// With `overwrite == false` an existing file is left untouched and
    /// [`ManifestError::AlreadyExists`] is returned.
    pub fn write(&self, dir: impl AsRef<Path>, overwrite: bool) -> Result<(), ManifestError> {
        let dir = dir.as_ref();
        let path = Self::path_in(dir);
        if !overwrite && path.exists() {
            return Err(ManifestError::AlreadyExists(path));
        }

        let content = self.to_text(true)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))?;
        }

        if overwrite {
            tmp.persist(&path).map_err(|e| ManifestError::Io(e.error))?;
        } else {
            // Another writer may have created the file since the check above.
            tmp.persist_noclobber(&path).map_err(|e| {
                if e.error.kind() == ErrorKind::AlreadyExists {
                    ManifestError::AlreadyExists(path.clone())
                } else {
                    ManifestError::Io(e.error)
                }
            })?;
        }
        debug!("wrote manifest {}", path.display());
        Ok(())
    }
}
