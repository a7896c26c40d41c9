use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;

use crate::OutputFormat;

/// Read a file and parse it as JSON, naming the file in any error
pub fn read_json<T: DeserializeOwned>(path: &str, what: &str) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file: {}", what, path))?;

    serde_json::from_str(&content).with_context(|| format!("Invalid {} JSON: {}", what, path))
}

/// Read an optional JSON file, falling back to `T::default()` when absent
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: Option<&str>, what: &str) -> Result<T> {
    match path {
        Some(path) => read_json(path, what),
        None => Ok(T::default()),
    }
}

/// Print a value as JSON for the machine-readable formats
///
/// Returns `false` for [`OutputFormat::Pretty`], leaving rendering to the caller.
pub fn print_machine<T: Serialize>(value: &T, output: &OutputFormat) -> Result<bool> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Compact => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Pretty => return Ok(false),
    }
    Ok(true)
}
