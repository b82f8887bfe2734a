//! Component manifests, identifiers and remote scopes for bit.
//!
//! This crate defines the schema layer: the per-component `bit.json` manifest
//! (`ComponentManifest`) with its default-filling, projection and persistence,
//! the identifier grammar (`BitId`, `BitIds`) used for dependencies, and the
//! remote scope map (`Remotes`).

pub mod constants;
pub mod id;
pub mod manifest;
pub mod remote;
pub mod types;

pub use constants::{
    BIT_JSON, DEFAULT_BIT_NAME, DEFAULT_BIT_VERSION, DEFAULT_BOX_NAME, DEFAULT_COMPILER,
    DEFAULT_TESTER, IMPL_FILE_NAME, SPEC_FILE_NAME,
};
pub use id::{is_valid_segment, BitId, BitIds, IdError};
pub use manifest::{
    ComponentManifest, Env, EnvProps, ManifestError, ManifestProps, PlainManifest, Sources,
    SourcesProps,
};
pub use remote::{Remote, RemoteLocation, Remotes};
pub use types::{BitName, BoxName, ScopeName};
