use chrono::NaiveDate;
use tracing::warn;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::config::BiographyOrder;
use crate::domain::{BiographyEntry, Minister};
use crate::error::{BuildError, Result};
use crate::types::{value_to_text, RawValue, Row};

/// Boolean-like cell: JSON bool, or case-insensitive `true`/`false`/`1`/`0`.
/// Absent cells take `default`; any other text reads as false.
pub fn coerce_bool(value: Option<&RawValue>, default: bool) -> bool {
    match value {
        None | Some(RawValue::Null) => default,
        Some(RawValue::Bool(b)) => *b,
        Some(RawValue::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(other) => match value_to_text(other) {
            None => default,
            Some(text) => text.eq_ignore_ascii_case("true") || text == "1",
        },
    }
}

/// Integer-like cell at `aliases` on `row`, 0 when absent.
///
/// Malformed values are a structural error: a silent default would
/// reorder biographies without anyone noticing.
pub fn coerce_int(row: &Row, table: &str, aliases: &[&str]) -> Result<i64> {
    let Some(value) = row.get(aliases) else {
        return Ok(0);
    };
    let malformed = || BuildError::InvalidNumber {
        table: table.to_string(),
        row: row.line,
        column: row.column_of(aliases),
        value: value_to_text(value).unwrap_or_default(),
    };

    match value {
        RawValue::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 1e15)
                    .map(|f| f as i64)
            })
            .ok_or_else(malformed),
        RawValue::String(s) => s.trim().parse::<i64>().map_err(|_| malformed()),
        _ => Err(malformed()),
    }
}

/// ISO `yyyy-mm-dd` (time part dropped) or `dd/mm/yyyy`, as an ISO date string
pub fn normalize_date(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let candidate = raw.split(['T', ' ']).next().unwrap_or_default();

    let parsed = NaiveDate::parse_from_str(candidate, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(candidate, "%d/%m/%Y"));
    match parsed {
        Ok(date) => Some(date.format("%Y-%m-%d").to_string()),
        Err(_) => {
            warn!(value = %raw, "Unrecognized date format, emitting null");
            None
        }
    }
}

/// Section label folded for grouping: accents stripped, lowercase
pub fn section_key(label: &str) -> String {
    label
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Stable in-place ordering of one biography list
pub fn order_biography(entries: &mut [BiographyEntry], order: BiographyOrder) {
    match order {
        BiographyOrder::SortIndex => entries.sort_by_key(|entry| entry.sort_index),
        BiographyOrder::SectionThenIndex => {
            entries.sort_by_cached_key(|entry| (section_key(&entry.bio_section), entry.sort_index))
        }
    }
}

/// Final ordering stage. Minister order is untouched; only biographies move.
pub fn finalize(mut ministers: Vec<Minister>, order: BiographyOrder) -> Vec<Minister> {
    for minister in &mut ministers {
        order_biography(&mut minister.biography, order);
    }
    ministers
}
