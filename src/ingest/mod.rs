//! Measurement log loading.
//!
//! Reads the JSON the host application stores: either a plain array of
//! entries or an object keyed by entry id. Malformed entries are logged and
//! skipped; only an unreadable document is an error.

use crate::models::{Measurement, RawMeasurement};
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// A loaded log plus the number of entries that had to be dropped.
#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    pub measurements: Vec<Measurement>,
    pub excluded: usize,
}

impl IngestOutcome {
    /// Entries seen in the source document.
    pub fn total(&self) -> usize {
        self.measurements.len() + self.excluded
    }
}

/// Load a measurement log from a JSON file.
pub fn load_log(path: &Path) -> Result<IngestOutcome> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read measurement log: {}", path.display()))?;

    parse_log(&content)
        .with_context(|| format!("Failed to parse measurement log: {}", path.display()))
}

/// Parse a measurement log from JSON text.
///
/// Entries keep document order for both shapes, keyed objects included, since
/// that order breaks ties between measurements sharing an instant.
pub fn parse_log(content: &str) -> Result<IngestOutcome> {
    let document: Value = serde_json::from_str(content).context("Invalid JSON")?;

    let entries: Vec<(String, Value)> = match document {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (format!("#{}", i), v))
            .collect(),
        Value::Object(map) => map.into_iter().collect(),
        Value::Null => Vec::new(),
        other => bail!(
            "Expected an array or an object of entries, found {}",
            json_kind(&other)
        ),
    };

    let mut outcome = IngestOutcome::default();
    for (key, value) in entries {
        let raw: RawMeasurement = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Skipping entry {}: {}", key, e);
                outcome.excluded += 1;
                continue;
            }
        };

        if raw.has_invalid_time() {
            warn!(
                "Entry {}: ignoring unparseable time {:?}",
                key,
                raw.time.as_deref().unwrap_or_default()
            );
        }

        match raw.resolve() {
            Ok(m) => outcome.measurements.push(m),
            Err(e) => {
                warn!("Skipping entry {}: {}", key, e);
                outcome.excluded += 1;
            }
        }
    }

    debug!(
        "Loaded {} measurements ({} excluded)",
        outcome.measurements.len(),
        outcome.excluded
    );

    Ok(outcome)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
