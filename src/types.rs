//! Core data model types.
//!
//! Upstream ingestion produces [`RawRecord`]s (header name → string value). The normalizer turns
//! each valid record into a [`NormalizedPosting`], using [`PostingColumns`] to find the fields.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One raw input row, exactly as produced by the ingester.
///
/// Values are kept as strings; no parsing happens until normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based row number in the source (the header is row 1 for CSV input).
    pub row: usize,
    /// Field name → raw value, in header order.
    pub fields: IndexMap<String, String>,
}

impl RawRecord {
    /// Create a record from header names and values zipped together.
    pub fn new<K, V>(row: usize, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            row,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the raw value of `name`, if the field is present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Number of fields in the record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Names of the six columns a posting is read from.
///
/// Defaults match the HeadHunter-style export: `name`, `salary_from`, `salary_to`,
/// `salary_currency`, `area_name`, `published_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostingColumns {
    /// Job title column.
    pub name: String,
    /// Lower salary bound column.
    pub salary_from: String,
    /// Upper salary bound column.
    pub salary_to: String,
    /// Currency code column.
    pub salary_currency: String,
    /// Location column.
    pub area_name: String,
    /// ISO-8601-prefixed publish date column.
    pub published_at: String,
}

impl PostingColumns {
    /// All column names in canonical order.
    pub fn names(&self) -> [&str; 6] {
        [
            self.name.as_str(),
            self.salary_from.as_str(),
            self.salary_to.as_str(),
            self.salary_currency.as_str(),
            self.area_name.as_str(),
            self.published_at.as_str(),
        ]
    }
}

impl Default for PostingColumns {
    fn default() -> Self {
        Self {
            name: "name".to_string(),
            salary_from: "salary_from".to_string(),
            salary_to: "salary_to".to_string(),
            salary_currency: "salary_currency".to_string(),
            area_name: "area_name".to_string(),
            published_at: "published_at".to_string(),
        }
    }
}

/// A validated posting with its salary converted to the common currency.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPosting {
    /// Job title.
    pub title: String,
    /// Lower salary bound in the original currency, truncated to whole units, if present.
    pub salary_low: Option<f64>,
    /// Upper salary bound in the original currency, truncated to whole units, if present.
    pub salary_high: Option<f64>,
    /// Original currency code.
    pub currency: String,
    /// Midpoint of the surviving bound(s), multiplied by the currency rate.
    pub average_salary: f64,
    /// Location name.
    pub location: String,
    /// Year taken from the first four characters of the publish date.
    pub year: i32,
}
