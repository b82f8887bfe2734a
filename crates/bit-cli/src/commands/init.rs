use super::{json_pretty, EXIT_SUCCESS};
use bit_core::{Consumer, CoreError};
use std::path::Path;

pub fn run(dir: &Path, force: bool, json: bool) -> Result<u8, CoreError> {
    let consumer = Consumer::init(dir, force)?;
    if json {
        let payload = serde_json::json!({
            "status": "initialized",
            "path": consumer.root().display().to_string(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("initialized bit consumer in {}", consumer.root().display());
    }
    Ok(EXIT_SUCCESS)
}
