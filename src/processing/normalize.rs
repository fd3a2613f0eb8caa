//! Record normalization: raw string fields → [`NormalizedPosting`].

use crate::error::{StatsError, StatsResult};
use crate::rates::RateLookup;
use crate::types::{NormalizedPosting, PostingColumns, RawRecord};

/// Why a structurally valid record did not become a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Currency missing or absent from the rate table.
    UnknownCurrency,
    /// Neither salary bound is present (or parseable).
    MissingSalary,
}

/// Outcome of normalizing one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalization {
    /// The record became a posting.
    Posting(NormalizedPosting),
    /// The record was dropped silently.
    Dropped(DropReason),
}

/// Normalize one record.
///
/// Checks run in a fixed order:
///
/// 1. currency: missing or unknown → [`DropReason::UnknownCurrency`]
/// 2. salary: both bounds → `(low + high) / 2`, otherwise the single present bound, neither →
///    [`DropReason::MissingSalary`]
/// 3. year: first four characters of the publish date. A malformed date is **not** a drop; it
///    returns [`StatsError::DateParse`] and aborts the caller's run.
///
/// Each bound is truncated toward zero before the midpoint is taken. A bound that is empty, not a
/// number, negative or not finite counts as absent.
pub fn normalize<L>(
    record: &RawRecord,
    columns: &PostingColumns,
    rates: &L,
) -> StatsResult<Normalization>
where
    L: RateLookup + ?Sized,
{
    let currency = record.get(&columns.salary_currency).unwrap_or("").trim();
    let rate = match currency {
        "" => None,
        code => rates.rate(code),
    };
    let Some(rate) = rate else {
        return Ok(Normalization::Dropped(DropReason::UnknownCurrency));
    };

    let salary_low = parse_bound(record.get(&columns.salary_from));
    let salary_high = parse_bound(record.get(&columns.salary_to));
    let midpoint = match (salary_low, salary_high) {
        (Some(low), Some(high)) => (low + high) / 2.0,
        (Some(low), None) => low,
        (None, Some(high)) => high,
        (None, None) => return Ok(Normalization::Dropped(DropReason::MissingSalary)),
    };

    let year = parse_year(record.row, record.get(&columns.published_at).unwrap_or(""))?;

    Ok(Normalization::Posting(NormalizedPosting {
        title: record.get(&columns.name).unwrap_or("").to_string(),
        salary_low,
        salary_high,
        currency: currency.to_string(),
        average_salary: rate * midpoint,
        location: record.get(&columns.area_name).unwrap_or("").to_string(),
        year,
    }))
}

/// Extract the year from the first four characters of a date string.
///
/// No calendar parsing happens: `"2007-12-03T17:34:36+0300"` and `"2007xx"` both yield `2007`.
pub fn parse_year(row: usize, raw: &str) -> StatsResult<i32> {
    let prefix: String = raw.chars().take(4).collect();
    if prefix.chars().count() < 4 {
        return Err(StatsError::DateParse {
            row,
            raw: raw.to_owned(),
            message: "date is shorter than four characters".to_string(),
        });
    }
    prefix.trim().parse::<i32>().map_err(|e| StatsError::DateParse {
        row,
        raw: raw.to_owned(),
        message: e.to_string(),
    })
}

fn parse_bound(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(f64::trunc)
}
