use super::{json_pretty, load_consumer, EXIT_SUCCESS};
use bit_core::{CoreError, CreateOptions};
use std::path::Path;

pub fn run(dir: &Path, name: &str, opts: &CreateOptions<'_>, json: bool) -> Result<u8, CoreError> {
    let consumer = load_consumer(dir)?;
    let component = consumer.create_component(name, opts)?;
    if json {
        let payload = serde_json::json!({
            "status": "created",
            "id": component.id.to_string(),
            "path": component.path.display().to_string(),
            "manifest": component.manifest.to_plain_object(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "created {} in {}",
            component.id,
            component.path.display()
        );
    }
    Ok(EXIT_SUCCESS)
}
