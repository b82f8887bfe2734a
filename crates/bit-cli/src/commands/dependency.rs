use super::{json_pretty, load_consumer, EXIT_SUCCESS};
use bit_core::CoreError;
use bit_schema::BitId;
use std::path::Path;

pub fn add(dir: &Path, id: &str, version: &str, json: bool) -> Result<u8, CoreError> {
    // Reject ids the resolver would not be able to read back.
    BitId::parse(id)?;
    let mut consumer = load_consumer(dir)?;
    consumer.manifest_mut().add_dependency(id, version);
    consumer.save()?;
    if json {
        let payload = serde_json::json!({ "status": "added", "id": id, "version": version });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("added dependency {id} ({version})");
    }
    Ok(EXIT_SUCCESS)
}

pub fn remove(dir: &Path, id: &str, json: bool) -> Result<u8, CoreError> {
    let mut consumer = load_consumer(dir)?;
    let existed = consumer.manifest().dependencies.contains_key(id);
    consumer.manifest_mut().remove_dependency(id);
    if existed {
        consumer.save()?;
    }
    if json {
        let payload = serde_json::json!({ "status": "removed", "id": id, "existed": existed });
        println!("{}", json_pretty(&payload)?);
    } else if existed {
        println!("removed dependency {id}");
    } else {
        println!("{id} is not a dependency");
    }
    Ok(EXIT_SUCCESS)
}

pub fn list(dir: &Path, json: bool) -> Result<u8, CoreError> {
    let consumer = load_consumer(dir)?;
    let ids = consumer.manifest().get_dependencies()?;
    if json {
        println!("{}", json_pretty(&ids)?);
    } else if ids.is_empty() {
        println!("no dependencies");
    } else {
        for id in &ids {
            println!("{id}");
        }
    }
    Ok(EXIT_SUCCESS)
}
