//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"name": "Dev", ...}, ...]`
//! - Newline-delimited JSON (NDJSON): one object per line
//!
//! The key set of the first object plays the role of the CSV header. Numbers and booleans are
//! kept as their JSON text; `null`, empty strings, nested arrays/objects, objects with a
//! different key count and array elements that are not objects at all are skipped by the same
//! structural gate as CSV rows.

use std::fs;
use std::path::Path;

use crate::error::{StatsError, StatsResult};
use crate::types::{PostingColumns, RawRecord};

use super::csv::require_columns;
use super::observability::IngestionStats;

/// Yields [`RawRecord`]s from parsed JSON objects.
pub struct JsonRecords {
    items: std::vec::IntoIter<serde_json::Value>,
    header_len: usize,
    stats: IngestionStats,
}

impl JsonRecords {
    /// Rows read and skipped so far.
    pub fn stats(&self) -> IngestionStats {
        self.stats
    }
}

impl Iterator for JsonRecords {
    type Item = StatsResult<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.items.next()?;
            self.stats.rows_read += 1;
            let row = self.stats.rows_read;

            let serde_json::Value::Object(obj) = item else {
                self.stats.rows_skipped += 1;
                continue;
            };
            let fields: Option<Vec<(String, String)>> = obj
                .into_iter()
                .map(|(k, v)| scalar_text(v).map(|text| (k, text)))
                .collect();

            match fields {
                Some(fields)
                    if fields.len() == self.header_len && fields.iter().all(|(_, v)| !v.is_empty()) =>
                {
                    return Some(Ok(RawRecord::new(row, fields)));
                }
                _ => self.stats.rows_skipped += 1,
            }
        }
    }
}

/// Read a JSON or NDJSON file.
pub fn json_records_from_path(
    path: impl AsRef<Path>,
    columns: &PostingColumns,
) -> StatsResult<JsonRecords> {
    let text = fs::read_to_string(path)?;
    json_records_from_str(&text, columns)
}

/// Parse JSON or NDJSON from an in-memory string.
pub fn json_records_from_str(input: &str, columns: &PostingColumns) -> StatsResult<JsonRecords> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(StatsError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    let items = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(v @ serde_json::Value::Object(_)) => vec![v],
        Ok(_) => {
            return Err(StatsError::SchemaMismatch {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            });
        }
        Err(_) => parse_ndjson(trimmed)?,
    };

    let header: Vec<String> = items
        .iter()
        .find_map(serde_json::Value::as_object)
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();
    require_columns(&header, columns)?;

    Ok(JsonRecords {
        items: items.into_iter(),
        header_len: header.len(),
        stats: IngestionStats::default(),
    })
}

fn parse_ndjson(input: &str) -> StatsResult<Vec<serde_json::Value>> {
    let mut values = Vec::new();
    for (i, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
            StatsError::SchemaMismatch {
                message: format!("invalid ndjson at line {}: {}", i + 1, e),
            }
        })?;
        values.push(v);
    }
    Ok(values)
}

fn scalar_text(v: serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null => Some(String::new()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
    }
}
