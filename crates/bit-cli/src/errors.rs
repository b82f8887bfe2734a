//! Maps known failure kinds to user-facing messages and exit codes.

use crate::commands::{EXIT_FAILURE, EXIT_MANIFEST_ERROR, EXIT_REMOTE_ERROR};
use bit_core::CoreError;
use bit_remote::RemoteError;
use bit_schema::ManifestError;
use console::Style;

/// A styled message for errors users are expected to hit, `None` otherwise.
pub fn classify(err: &CoreError) -> Option<String> {
    let msg = match err {
        CoreError::Manifest(ManifestError::NotFound(_)) => {
            "bit.json not found. to create a new consumer, please use `bit init`".to_owned()
        }
        CoreError::Manifest(ManifestError::AlreadyExists(path)) => format!(
            "bit.json already exists at {}. use --force to overwrite it",
            path.display()
        ),
        CoreError::ComponentNotFound(id) => {
            format!("bit {id} not found. to create a new bit, please use `bit create {id}`")
        }
        CoreError::AlreadyExistsExternally(id) => format!(
            "bit \"{id}\" already exists in the external library try \"bit create -f {id}\" to create a local copy anyway"
        ),
        CoreError::CompilerNotFound(compiler) => format!(
            "The compiler \"{compiler}\" is not installed, please use \"bit install {compiler}\" to install it."
        ),
        CoreError::Remote(RemoteError::UnknownRemote(name)) => format!(
            "remote scope \"{name}\" is not configured. add it with `bit remote add {name} <location>`"
        ),
        _ => return None,
    };
    Some(Style::new().red().apply_to(msg).to_string())
}

pub fn exit_code(err: &CoreError) -> u8 {
    match err {
        CoreError::Manifest(_) => EXIT_MANIFEST_ERROR,
        CoreError::Remote(_) => EXIT_REMOTE_ERROR,
        _ => EXIT_FAILURE,
    }
}
