use colored::Colorize;
use serde_json::Value;
use spacectl_core::{Change, ObservedState};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

const REDACTED: &str = "********";

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_state(state: &ObservedState, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&redacted(state)?)?);
        }
        OutputFormat::Table => println!("{}", state_table(state)),
    }
    Ok(())
}

pub fn print_plan(changes: &[Change]) {
    if changes.is_empty() {
        print_success("No changes. Space matches the configuration.");
        return;
    }
    println!("{}", "Planned changes, in order:".cyan());
    for (i, change) in changes.iter().enumerate() {
        println!("  {}. {}", i + 1, change);
    }
}

/// State as JSON with secret values masked.
fn redacted(state: &ObservedState) -> serde_json::Result<Value> {
    let mut value = serde_json::to_value(state)?;
    if let Some(Value::Object(secrets)) = value.get_mut("secrets") {
        for secret in secrets.values_mut() {
            *secret = Value::String(REDACTED.to_string());
        }
    }
    Ok(value)
}

fn state_table(state: &ObservedState) -> String {
    let unknown = || "-".to_string();
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    builder.push_record(["id".to_string(), state.id.clone()]);
    builder.push_record(["name".to_string(), state.name.clone()]);
    builder.push_record(["private".to_string(), state.private.to_string()]);
    builder.push_record(["sdk".to_string(), state.sdk.clone().unwrap_or_else(unknown)]);
    builder.push_record([
        "hardware".to_string(),
        state.hardware.clone().unwrap_or_else(unknown),
    ]);
    builder.push_record([
        "storage".to_string(),
        state.storage.clone().unwrap_or_else(unknown),
    ]);
    builder.push_record([
        "sleep_time".to_string(),
        state
            .sleep_time
            .map(|s| s.to_string())
            .unwrap_or_else(unknown),
    ]);
    builder.push_record([
        "secrets".to_string(),
        state
            .secrets
            .as_ref()
            .map(|s| s.keys().cloned().collect::<Vec<_>>().join(", "))
            .unwrap_or_else(|| "(unmanaged)".to_string()),
    ]);
    builder.push_record([
        "variables".to_string(),
        state
            .variables
            .as_ref()
            .map(|v| {
                v.iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_else(|| "(unmanaged)".to_string()),
    ]);
    if let Some(modified) = &state.last_modified {
        builder.push_record(["last_modified".to_string(), modified.clone()]);
    }
    builder.build().with(Style::rounded()).to_string()
}
