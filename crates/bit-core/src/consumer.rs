use crate::CoreError;
use bit_remote::{ComponentBundle, RemoteError, ScopeBackend, SourceFile};
use bit_schema::{
    is_valid_segment, BitId, ComponentManifest, EnvProps, IdError, ManifestError, ManifestProps,
    Remote, DEFAULT_COMPILER,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A component found in the consumer's `components/` tree.
#[derive(Debug, Clone)]
pub struct Component {
    pub id: BitId,
    pub path: PathBuf,
    pub manifest: ComponentManifest,
}

impl Component {
    /// Collect the manifest and existing source files for export.
    pub fn bundle(&self) -> Result<ComponentBundle, CoreError> {
        let mut files = Vec::new();
        for basename in [self.manifest.impl_basename(), self.manifest.spec_basename()] {
            let path = self.path.join(basename);
            if path.is_file() {
                files.push(SourceFile {
                    basename: basename.to_owned(),
                    content: fs::read(&path)?,
                });
            }
        }
        Ok(ComponentBundle {
            id: self.id.clone(),
            manifest: self.manifest.clone(),
            files,
        })
    }
}

/// What `show` displays about a component.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentInfo {
    pub name: String,
    #[serde(rename = "box")]
    pub box_name: String,
    pub version: String,
    pub compiler: String,
    pub tester: String,
    pub dependencies: BTreeMap<String, String>,
    pub path: String,
}

impl ComponentInfo {
    fn new(manifest: &ComponentManifest, path: String) -> Self {
        Self {
            name: manifest.name.clone(),
            box_name: manifest.box_name.clone(),
            version: manifest.version.clone(),
            compiler: manifest.compiler_name().to_owned(),
            tester: manifest.tester_name().to_owned(),
            dependencies: manifest.dependencies.clone(),
            path,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions<'a> {
    pub box_name: Option<&'a str>,
    pub compiler: Option<&'a str>,
    pub tester: Option<&'a str>,
    pub force: bool,
}

/// A local workspace rooted at a directory containing `bit.json`.
#[derive(Debug, Clone)]
pub struct Consumer {
    root: PathBuf,
    manifest: ComponentManifest,
}

impl Consumer {
    /// Create the consumer manifest and directory skeleton under `root`.
    pub fn init(root: impl Into<PathBuf>, force: bool) -> Result<Self, CoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let manifest = ComponentManifest::default();
        manifest.write(&root, force)?;
        let consumer = Self { root, manifest };
        fs::create_dir_all(consumer.components_dir())?;
        fs::create_dir_all(consumer.environments_dir())?;
        info!("initialized consumer at {}", consumer.root.display());
        Ok(consumer)
    }

    pub fn load(root: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let root = root.into();
        let manifest = ComponentManifest::load(&root)?;
        Ok(Self { root, manifest })
    }

    pub fn save(&self) -> Result<(), CoreError> {
        Ok(self.manifest.write(&self.root, true)?)
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &ComponentManifest {
        &self.manifest
    }

    pub fn manifest_mut(&mut self) -> &mut ComponentManifest {
        &mut self.manifest
    }

    #[inline]
    pub fn components_dir(&self) -> PathBuf {
        self.root.join("components")
    }

    #[inline]
    pub fn component_dir(&self, id: &BitId) -> PathBuf {
        self.components_dir().join(&id.box_name).join(&id.name)
    }

    /// Installed compilers and testers live under `.bit/environments/<id>`.
    #[inline]
    pub fn environments_dir(&self) -> PathBuf {
        self.root.join(".bit").join("environments")
    }

    pub fn is_environment_installed(&self, env_id: &str) -> bool {
        env_id == DEFAULT_COMPILER
            || (is_valid_segment(env_id) && self.environments_dir().join(env_id).is_dir())
    }

    pub fn get_component(&self, id: &BitId) -> Result<Component, CoreError> {
        let path = self.component_dir(id);
        let manifest = match ComponentManifest::load(&path) {
            Ok(m) => m,
            Err(ManifestError::NotFound(_)) => {
                return Err(CoreError::ComponentNotFound(id.box_and_name()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Component {
            id: BitId::new(id.box_name.clone(), id.name.clone()),
            path,
            manifest,
        })
    }

    /// All components with a manifest, ordered by box then name.
    pub fn list_components(&self) -> Result<Vec<Component>, CoreError> {
        let dir = self.components_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut components = Vec::new();
        for box_entry in fs::read_dir(&dir)? {
            let box_entry = box_entry?;
            if !box_entry.file_type()?.is_dir() {
                continue;
            }
            let box_name = box_entry.file_name().to_string_lossy().into_owned();
            for entry in fs::read_dir(box_entry.path())? {
                let entry = entry?;
                if !entry.file_type()?.is_dir() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                let id = BitId::new(box_name.as_str(), name.as_str());
                match self.get_component(&id) {
                    Ok(component) => components.push(component),
                    Err(CoreError::ComponentNotFound(_)) => {
                        debug!("skipping {} without manifest", entry.path().display());
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        components.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(components)
    }

    /// Create a new component directory with its manifest and empty sources.
    pub fn create_component(
        &self,
        name: &str,
        opts: &CreateOptions<'_>,
    ) -> Result<Component, CoreError> {
        let mut id = BitId::parse(name)?;
        if let Some(box_name) = opts.box_name {
            if !is_valid_segment(box_name) {
                return Err(IdError::InvalidSegment(box_name.to_owned()).into());
            }
            id.box_name = box_name.into();
        }
        id.scope = None;
        id.version = None;

        if !opts.force {
            let deps = self.manifest.get_dependencies()?;
            if deps.search_without_scope_and_version(&id).is_some() {
                return Err(CoreError::AlreadyExistsExternally(id.box_and_name()));
            }
        }

        let compiler = opts.compiler.unwrap_or(self.manifest.compiler_name());
        if !self.is_environment_installed(compiler) {
            return Err(CoreError::CompilerNotFound(compiler.to_owned()));
        }
        let tester = opts.tester.unwrap_or(self.manifest.tester_name());

        let manifest = ComponentManifest::new(ManifestProps {
            name: Some(id.name.to_string()),
            box_name: Some(id.box_name.to_string()),
            env: Some(EnvProps {
                compiler: Some(compiler.to_owned()),
                tester: Some(tester.to_owned()),
            }),
            ..ManifestProps::default()
        });

        let path = self.component_dir(&id);
        fs::create_dir_all(&path)?;
        manifest.write(&path, opts.force)?;
        for basename in [manifest.impl_basename(), manifest.spec_basename()] {
            let file = path.join(basename);
            if !file.exists() {
                fs::write(&file, "")?;
            }
        }
        info!("created component {id} at {}", path.display());

        Ok(Component { id, path, manifest })
    }

    /// Resolve a component by `[box/]name` and describe it.
    pub fn show(&self, name: &str) -> Result<ComponentInfo, CoreError> {
        let id = BitId::parse(name)?;
        let component = self.get_component(&id)?;
        Ok(ComponentInfo::new(
            &component.manifest,
            component.path.display().to_string(),
        ))
    }

    /// Describe the latest export of a component in a remote scope.
    pub fn show_remote(&self, name: &str, remote_name: &str) -> Result<ComponentInfo, CoreError> {
        let id = BitId::parse(name)?;
        let remote = self.remote(remote_name)?;
        let backend = self.open_remote(&remote);
        let manifest = bit_remote::fetch_manifest(backend.as_ref(), &id)?;
        Ok(ComponentInfo::new(
            &manifest,
            format!("{}/{}", remote.location, id.box_and_name()),
        ))
    }

    pub fn remote(&self, name: &str) -> Result<Remote, CoreError> {
        self.manifest
            .get_remotes()
            .get(name)
            .cloned()
            .ok_or_else(|| RemoteError::UnknownRemote(name.to_owned()).into())
    }

    pub fn open_remote(&self, remote: &Remote) -> Box<dyn ScopeBackend> {
        bit_remote::open_backend(remote, &self.root)
    }
}
