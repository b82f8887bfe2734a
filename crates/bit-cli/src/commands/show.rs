use super::{json_pretty, load_consumer, EXIT_SUCCESS};
use bit_core::{ComponentInfo, CoreError};
use console::Style;
use std::path::Path;

pub fn run(dir: &Path, name: &str, remote: Option<&str>, json: bool) -> Result<u8, CoreError> {
    let consumer = load_consumer(dir)?;
    let info = match remote {
        Some(remote) => consumer.show_remote(name, remote)?,
        None => consumer.show(name)?,
    };
    if json {
        println!("{}", json_pretty(&info)?);
    } else {
        print!("{}", report(&info));
    }
    Ok(EXIT_SUCCESS)
}

fn report(info: &ComponentInfo) -> String {
    let dependencies: Vec<&str> = info.dependencies.keys().map(String::as_str).collect();
    format!(
        "\n    {}\n\n      version -> {}\n      compiler -> {}\n      tester -> {}\n      dependencies -> {}\n      path -> {}\n\n",
        Style::new().blue().apply_to(&info.name),
        info.version,
        info.compiler,
        info.tester,
        dependencies.join(", "),
        info.path,
    )
}
