use super::{json_pretty, load_consumer, EXIT_SUCCESS};
use bit_core::CoreError;
use std::path::Path;

pub fn add(dir: &Path, name: &str, location: &str, json: bool) -> Result<u8, CoreError> {
    let mut consumer = load_consumer(dir)?;
    consumer.manifest_mut().add_remote(name, location);
    consumer.save()?;
    let remote = consumer.remote(name)?;
    if json {
        println!("{}", json_pretty(&remote)?);
    } else {
        println!("added remote scope {name} -> {}", remote.location);
    }
    Ok(EXIT_SUCCESS)
}

pub fn remove(dir: &Path, name: &str, json: bool) -> Result<u8, CoreError> {
    let mut consumer = load_consumer(dir)?;
    // Fails with an unknown-remote error when absent.
    consumer.remote(name)?;
    consumer.manifest_mut().remove_remote(name);
    consumer.save()?;
    if json {
        let payload = serde_json::json!({ "status": "removed", "name": name });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("removed remote scope {name}");
    }
    Ok(EXIT_SUCCESS)
}

pub fn list(dir: &Path, json: bool) -> Result<u8, CoreError> {
    let consumer = load_consumer(dir)?;
    let remotes = consumer.manifest().get_remotes();
    if json {
        println!("{}", json_pretty(&remotes)?);
    } else if remotes.is_empty() {
        println!("no remote scopes");
    } else {
        for remote in remotes.iter() {
            println!("{:<16} {}", remote.name, remote.location);
        }
    }
    Ok(EXIT_SUCCESS)
}
