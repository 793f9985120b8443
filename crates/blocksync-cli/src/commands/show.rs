//! Show command implementation
//!
//! Prints the entries already in each selected block. Discovery does not run.

use colored::Colorize;
use serde_json::{Map, Value, json};

use blocksync_core::{Entry, Schema};

use super::{load_jobs, select};
use crate::error::Result;

fn entry_json(entry: &Entry, schema: &Schema) -> Value {
    let fields: Map<String, Value> = schema
        .fields()
        .iter()
        .zip(entry.values())
        .map(|(field, value)| (field.clone(), Value::String(value.clone())))
        .collect();
    Value::Object(fields)
}

/// Run the show command
pub fn run_show(config: &str, names: &[String], json: bool) -> Result<()> {
    let jobs = load_jobs(config)?;
    let selected = select(&jobs, names)?;

    let mut output = Vec::new();
    for job in selected {
        let entries = job.entries()?;
        let schema = job.schema();

        if json {
            output.push(json!({
                "job": job.name(),
                "document": job.document().as_str(),
                "entries": entries.iter().map(|e| entry_json(e, schema)).collect::<Vec<_>>(),
            }));
            continue;
        }

        println!(
            "{} {} ({} entries)",
            job.name().cyan().bold(),
            job.document().as_str().dimmed(),
            entries.len()
        );
        for entry in &entries {
            let others: Vec<String> = schema
                .fields()
                .iter()
                .zip(entry.values())
                .filter(|(field, _)| field.as_str() != schema.key_field())
                .map(|(field, value)| format!("{}={:?}", field, value))
                .collect();
            println!("  {} {}", entry.key().bold(), others.join(" "));
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&Value::Array(output))?);
    }
    Ok(())
}
