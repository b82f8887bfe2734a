use super::{json_pretty, load_consumer, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use bit_core::{CoreError, EjectResults, ExportResults};
use console::Style;
use std::path::Path;

pub fn run(
    dir: &Path,
    remote: &str,
    ids: &[String],
    eject: bool,
    json: bool,
) -> Result<u8, CoreError> {
    let mut consumer = load_consumer(dir)?;

    let pb = spinner("exporting components…");
    let results = consumer.export(ids, remote, eject).map_err(|e| {
        spin_fail(&pb, "export failed");
        e
    })?;
    spin_ok(&pb, "export complete");

    if json {
        let payload = serde_json::json!({
            "remote": remote,
            "exported": results.exported.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "not_tracked": results.not_tracked.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "eject_results": results.eject_results,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("{}", report(&results, remote));
    }
    Ok(EXIT_SUCCESS)
}

fn report(results: &ExportResults, remote: &str) -> String {
    if results.is_empty() {
        return Style::new().yellow().apply_to("nothing to export").to_string();
    }

    let mut out = String::new();
    if !results.not_tracked.is_empty() {
        let ids: Vec<String> = results.not_tracked.iter().map(ToString::to_string).collect();
        out.push_str(
            &Style::new()
                .yellow()
                .apply_to(format!(
                    "the following components are not tracked locally and were not exported\n{}\n",
                    ids.join(", ")
                ))
                .to_string(),
        );
    }
    if !results.exported.is_empty() {
        out.push_str(
            &Style::new()
                .green()
                .apply_to(format!(
                    "exported {} components to scope {}",
                    results.exported.len(),
                    Style::new().bold().apply_to(remote)
                ))
                .to_string(),
        );
    }
    if let Some(eject) = &results.eject_results {
        out.push('\n');
        out.push_str(&eject_report(eject));
    }
    out
}

fn eject_report(eject: &EjectResults) -> String {
    let mut lines = Vec::new();
    if !eject.ejected.is_empty() {
        let ids: Vec<String> = eject.ejected.iter().map(ToString::to_string).collect();
        lines.push(format!(
            "successfully ejected the following components\n{}",
            ids.join("\n")
        ));
    }
    for failure in &eject.failed {
        lines.push(
            Style::new()
                .red()
                .apply_to(format!("failed to eject {}: {}", failure.id, failure.reason))
                .to_string(),
        );
    }
    lines.join("\n")
}
