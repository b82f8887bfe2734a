use crate::consumer::{Component, Consumer};
use crate::CoreError;
use bit_remote::ScopeBackend;
use bit_schema::BitId;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct EjectFailure {
    pub id: BitId,
    pub reason: String,
}

/// Outcome of replacing exported components with scope dependencies.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EjectResults {
    pub ejected: Vec<BitId>,
    pub failed: Vec<EjectFailure>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportResults {
    /// Components pushed to the scope.
    pub exported: Vec<BitId>,
    /// Requested ids with no local component.
    pub not_tracked: Vec<BitId>,
    /// Present only when ejection was requested.
    pub eject_results: Option<EjectResults>,
}

impl ExportResults {
    pub fn is_empty(&self) -> bool {
        self.exported.is_empty() && self.not_tracked.is_empty()
    }
}

impl Consumer {
    /// Export components to the named remote scope.
    ///
    /// `patterns` may be empty (every local component), exact ids, or
    /// `box/*` wildcards.
    pub fn export(
        &mut self,
        patterns: &[String],
        remote_name: &str,
        eject: bool,
    ) -> Result<ExportResults, CoreError> {
        let remote = self.remote(remote_name)?;
        let backend = self.open_remote(&remote);
        self.export_to(patterns, remote_name, backend.as_ref(), eject)
    }

    /// Like [`Consumer::export`] with an explicit backend.
    pub fn export_to(
        &mut self,
        patterns: &[String],
        remote_name: &str,
        backend: &dyn ScopeBackend,
        eject: bool,
    ) -> Result<ExportResults, CoreError> {
        let (components, not_tracked) = self.select_components(patterns)?;
        info!(
            "exporting {} components to scope {remote_name}",
            components.len()
        );

        let mut exported = Vec::with_capacity(components.len());
        for component in &components {
            let result = bit_remote::push_component(backend, &component.bundle()?)?;
            info!(
                "exported {} ({} sources pushed, {} skipped)",
                result.id, result.sources_pushed, result.sources_skipped
            );
            exported.push(component.id.clone().with_version(component.manifest.version.clone()));
        }

        let eject_results = if eject {
            Some(self.eject(&components, remote_name)?)
        } else {
            None
        };

        Ok(ExportResults {
            exported,
            not_tracked,
            eject_results,
        })
    }

    fn select_components(
        &self,
        patterns: &[String],
    ) -> Result<(Vec<Component>, Vec<BitId>), CoreError> {
        if patterns.is_empty() {
            return Ok((self.list_components()?, Vec::new()));
        }

        let mut selected: Vec<Component> = Vec::new();
        let mut not_tracked = Vec::new();
        for pattern in patterns {
            let matches = if pattern == "*" {
                self.list_components()?
            } else if let Some(box_name) = pattern.strip_suffix("/*") {
                self.list_components()?
                    .into_iter()
                    .filter(|c| c.id.box_name == box_name)
                    .collect()
            } else {
                let id = BitId::parse(pattern)?;
                match self.get_component(&id) {
                    Ok(component) => vec![component],
                    Err(CoreError::ComponentNotFound(_)) => {
                        not_tracked.push(id);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            };
            for component in matches {
                if !selected.iter().any(|c| c.id == component.id) {
                    selected.push(component);
                }
            }
        }
        Ok((selected, not_tracked))
    }

    /// Drop local copies of exported components and depend on the scope
    /// versions instead.
    fn eject(
        &mut self,
        components: &[Component],
        remote_name: &str,
    ) -> Result<EjectResults, CoreError> {
        let mut results = EjectResults::default();
        for component in components {
            if let Err(e) = fs::remove_dir_all(&component.path) {
                warn!("failed to eject {}: {e}", component.id);
                results.failed.push(EjectFailure {
                    id: component.id.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
            if let Some(box_dir) = component.path.parent() {
                // The box stays while it still holds other components.
                match fs::remove_dir(box_dir) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::DirectoryNotEmpty => {}
                    Err(e) => debug!("kept box directory {}: {e}", box_dir.display()),
                }
            }
            let scoped = component.id.clone().with_scope(remote_name);
            self.manifest_mut()
                .add_dependency(&scoped.to_string_without_version(), &component.manifest.version);
            results.ejected.push(scoped);
        }
        if !results.ejected.is_empty() {
            self.save()?;
        }
        Ok(results)
    }
}
