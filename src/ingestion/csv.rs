//! CSV ingestion implementation.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{StatsError, StatsResult};
use crate::types::{PostingColumns, RawRecord};

use super::observability::IngestionStats;

/// Lazily yields [`RawRecord`]s from a CSV reader, one row at a time.
///
/// Rules:
///
/// - The first row is the header. A leading UTF-8 BOM is stripped from it.
/// - The header must contain every column in [`PostingColumns`] (order can differ).
/// - Rows whose field count differs from the header, or that contain an empty field, are skipped
///   silently and only counted in [`IngestionStats::rows_skipped`].
pub struct CsvRecords<R> {
    records: csv::StringRecordsIntoIter<R>,
    header: Vec<String>,
    stats: IngestionStats,
}

impl<R: Read> CsvRecords<R> {
    /// Header names, in file order.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Rows read and skipped so far.
    pub fn stats(&self) -> IngestionStats {
        self.stats
    }
}

impl<R: Read> Iterator for CsvRecords<R> {
    type Item = StatsResult<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e.into())),
            };
            self.stats.rows_read += 1;
            // Physical line the record starts on; the header is line 1.
            let row = record
                .position()
                .map_or(self.stats.rows_read + 1, |pos| pos.line() as usize);

            if !is_structurally_valid(record.iter(), self.header.len()) {
                self.stats.rows_skipped += 1;
                continue;
            }
            return Some(Ok(RawRecord::new(
                row,
                self.header.iter().map(String::as_str).zip(record.iter()),
            )));
        }
    }
}

/// Open a CSV file for lazy record reading.
///
/// The file is closed when the returned iterator is dropped.
pub fn csv_records_from_path(
    path: impl AsRef<Path>,
    columns: &PostingColumns,
) -> StatsResult<CsvRecords<File>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    csv_records_from_reader(rdr, columns)
}

/// Wrap an existing CSV reader.
///
/// The reader must be configured with `has_headers(true)`; use `flexible(true)` so rows with a
/// wrong field count are skipped instead of failing the read.
pub fn csv_records_from_reader<R: Read>(
    mut rdr: csv::Reader<R>,
    columns: &PostingColumns,
) -> StatsResult<CsvRecords<R>> {
    let header: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();
    require_columns(&header, columns)?;

    Ok(CsvRecords {
        records: rdr.into_records(),
        header,
        stats: IngestionStats::default(),
    })
}

/// Structural validity gate: the row has exactly `expected_len` fields and none is empty.
pub fn is_structurally_valid<'a>(fields: impl IntoIterator<Item = &'a str>, expected_len: usize) -> bool {
    let mut len = 0usize;
    for field in fields {
        if field.is_empty() {
            return false;
        }
        len += 1;
    }
    len == expected_len
}

pub(crate) fn require_columns(header: &[String], columns: &PostingColumns) -> StatsResult<()> {
    for name in columns.names() {
        if !header.iter().any(|h| h == name) {
            return Err(StatsError::SchemaMismatch {
                message: format!("missing required column '{name}'. headers={header:?}"),
            });
        }
    }
    Ok(())
}
