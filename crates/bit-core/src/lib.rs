//! Local consumer workspace for bit.
//!
//! A consumer is a directory with its own `bit.json` (remotes, dependencies
//! and default environment) and a `components/<box>/<name>/` tree holding
//! the components being authored. This crate ties the schema and remote
//! crates together: component lookup and creation, `show`, and export to a
//! remote scope with optional ejection.

pub mod consumer;
pub mod export;

pub use consumer::{Component, ComponentInfo, Consumer, CreateOptions};
pub use export::{EjectFailure, EjectResults, ExportResults};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("manifest error: {0}")]
    Manifest(#[from] bit_schema::ManifestError),
    #[error("invalid component id: {0}")]
    Id(#[from] bit_schema::IdError),
    #[error("remote error: {0}")]
    Remote(#[from] bit_remote::RemoteError),
    #[error("component not found: {0}")]
    ComponentNotFound(String),
    #[error("component '{0}' already exists as an external dependency")]
    AlreadyExistsExternally(String),
    #[error("compiler not installed: {0}")]
    CompilerNotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
