//! Per-field value casting.
//!
//! The GET path sees only strings; the JSON path sees loosely typed values.
//! [`ValueCaster`] turns both into the same [`FilterValue`] so that
//! `age=18` in a query string and `{"value": 18.0}` in a body compile to the
//! same bound parameter.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::value::FilterValue;
use crate::errors::SearchError;
use crate::options::{FieldType, SearchOptions};

const IN_EXPECTED: &str = "a list or a comma-separated string";
const BETWEEN_EXPECTED: &str = "exactly 2 items";

/// Split a comma-separated value, trimming each part and dropping empty ones.
#[must_use]
pub fn split_csv(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// `YYYY-MM-DD` at midnight UTC. Anything not exactly that shape is rejected,
/// including single-digit months and signed years.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| {
            if i == 4 || i == 7 {
                *b == b'-'
            } else {
                b.is_ascii_digit()
            }
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.and_utc())
        })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

fn midnight(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.date_naive()
        .and_hms_opt(0, 0, 0)
        .map_or(dt, |naive| naive.and_utc())
}

/// Casts values according to the configured [`FieldType`]s. Fields without a
/// type, or typed as `String`, pass through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ValueCaster<'a> {
    field_types: &'a HashMap<String, FieldType>,
}

impl<'a> ValueCaster<'a> {
    #[must_use]
    pub const fn new(field_types: &'a HashMap<String, FieldType>) -> Self {
        Self { field_types }
    }

    #[must_use]
    pub const fn from_options(options: &'a SearchOptions) -> Self {
        Self::new(options.field_types())
    }

    fn typed(&self, field: &str) -> Option<FieldType> {
        self.field_types
            .get(field)
            .copied()
            .filter(|ty| *ty != FieldType::String)
    }

    /// Cast a raw query-string value.
    ///
    /// # Errors
    /// The `Invalid*` error matching the field's type when `raw` does not parse.
    pub fn cast_from_str(&self, field: &str, raw: &str) -> Result<FilterValue, SearchError> {
        let Some(ty) = self.typed(field) else {
            return Ok(FilterValue::String(raw.to_string()));
        };
        let trimmed = raw.trim();
        let err = |make: fn(String, String) -> SearchError| make(field.to_string(), raw.to_string());

        match ty {
            FieldType::String => Ok(FilterValue::String(raw.to_string())),
            FieldType::Int => trimmed
                .parse()
                .map(FilterValue::Int64)
                .map_err(|_| err(|field, raw| SearchError::InvalidInt { field, raw })),
            FieldType::Int64 => trimmed
                .parse()
                .map(FilterValue::Int64)
                .map_err(|_| err(|field, raw| SearchError::InvalidInt64 { field, raw })),
            FieldType::Float64 => trimmed
                .parse()
                .map(FilterValue::Float64)
                .map_err(|_| err(|field, raw| SearchError::InvalidFloat { field, raw })),
            FieldType::Bool => parse_bool(trimmed)
                .map(FilterValue::Bool)
                .ok_or_else(|| err(|field, raw| SearchError::InvalidBool { field, raw })),
            FieldType::Date => parse_date(trimmed)
                .map(FilterValue::Date)
                .ok_or_else(|| err(|field, raw| SearchError::InvalidDate { field, raw })),
            FieldType::Time => parse_time(trimmed)
                .map(FilterValue::Timestamp)
                .ok_or_else(|| err(|field, raw| SearchError::InvalidTime { field, raw })),
            FieldType::DateTime => parse_time(trimmed)
                .map(|dt| FilterValue::NaiveTimestamp(dt.naive_utc()))
                .ok_or_else(|| err(|field, raw| SearchError::InvalidTime { field, raw })),
        }
    }

    /// Normalize a scalar JSON value to the field's type.
    ///
    /// Strings are cast as in [`cast_from_str`](Self::cast_from_str). Numbers
    /// are converted between integer and float, with floats truncated toward
    /// zero for integer fields. Structured dates are truncated to their day for
    /// `Date` fields, kept as instants for `Time` fields and read as UTC wall
    /// time for `DateTime` fields.
    ///
    /// # Errors
    /// The `Invalid*` error matching the field's type when the value has the
    /// wrong kind or does not parse.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn normalize_json_value(
        &self,
        field: &str,
        value: FilterValue,
    ) -> Result<FilterValue, SearchError> {
        let Some(ty) = self.typed(field) else {
            return Ok(value);
        };
        if let FilterValue::String(raw) = &value {
            return self.cast_from_str(field, raw);
        }

        let normalized = match (ty, &value) {
            (FieldType::Int | FieldType::Int64, FilterValue::Int64(i)) => Some(FilterValue::Int64(*i)),
            (FieldType::Int | FieldType::Int64, FilterValue::Float64(f)) => {
                Some(FilterValue::Int64(f.trunc() as i64))
            }
            (FieldType::Float64, FilterValue::Float64(f)) => Some(FilterValue::Float64(*f)),
            (FieldType::Float64, FilterValue::Int64(i)) => Some(FilterValue::Float64(*i as f64)),
            (FieldType::Bool, FilterValue::Bool(b)) => Some(FilterValue::Bool(*b)),
            (FieldType::Date, FilterValue::Date(dt) | FilterValue::Timestamp(dt)) => {
                Some(FilterValue::Date(midnight(*dt)))
            }
            (FieldType::Date, FilterValue::NaiveTimestamp(dt)) => {
                Some(FilterValue::Date(midnight(dt.and_utc())))
            }
            (FieldType::Time, FilterValue::Date(_) | FilterValue::Timestamp(_)) => Some(value.clone()),
            (FieldType::Time, FilterValue::NaiveTimestamp(dt)) => {
                Some(FilterValue::Timestamp(dt.and_utc()))
            }
            (FieldType::DateTime, FilterValue::Date(dt) | FilterValue::Timestamp(dt)) => {
                Some(FilterValue::NaiveTimestamp(dt.naive_utc()))
            }
            (FieldType::DateTime, FilterValue::NaiveTimestamp(_)) => Some(value.clone()),
            _ => None,
        };

        normalized.ok_or_else(|| {
            let (field, raw) = (field.to_string(), value.to_string());
            match ty {
                FieldType::Int | FieldType::String => SearchError::InvalidInt { field, raw },
                FieldType::Int64 => SearchError::InvalidInt64 { field, raw },
                FieldType::Float64 => SearchError::InvalidFloat { field, raw },
                FieldType::Bool => SearchError::InvalidBool { field, raw },
                FieldType::Date => SearchError::InvalidDate { field, raw },
                FieldType::Time | FieldType::DateTime => SearchError::InvalidTime { field, raw },
            }
        })
    }

    /// Cast every item of a comma-separated string. Empty items are dropped,
    /// so `""` yields an empty list.
    ///
    /// # Errors
    /// The first item that fails to cast.
    pub fn cast_list_from_str(&self, field: &str, raw: &str) -> Result<FilterValue, SearchError> {
        split_csv(raw)
            .into_iter()
            .map(|part| self.cast_from_str(field, part))
            .collect::<Result<Vec<_>, _>>()
            .map(FilterValue::List)
    }

    /// Cast a `low,high` string into a pair.
    ///
    /// # Errors
    /// `MalformedList` unless there are exactly two non-empty items, or the
    /// first bound that fails to cast.
    pub fn cast_pair_from_str(&self, field: &str, raw: &str) -> Result<FilterValue, SearchError> {
        match split_csv(raw).as_slice() {
            [low, high] => Ok(FilterValue::pair(
                self.cast_from_str(field, low)?,
                self.cast_from_str(field, high)?,
            )),
            _ => Err(malformed(field, "BETWEEN", BETWEEN_EXPECTED)),
        }
    }

    /// Normalize the operand of `IN`: a CSV string or a JSON array.
    ///
    /// # Errors
    /// `MalformedList` for any other shape, or the first item that fails to cast.
    pub fn normalize_list(&self, field: &str, value: FilterValue) -> Result<FilterValue, SearchError> {
        match value {
            FilterValue::String(raw) => self.cast_list_from_str(field, &raw),
            FilterValue::List(items) => items
                .into_iter()
                .map(|item| self.normalize_json_value(field, item))
                .collect::<Result<Vec<_>, _>>()
                .map(FilterValue::List),
            _ => Err(malformed(field, "IN", IN_EXPECTED)),
        }
    }

    /// Normalize the operand of `BETWEEN`: a `low,high` string, a two-item
    /// array, or an existing pair.
    ///
    /// # Errors
    /// `MalformedList` for any other shape or arity, or the first bound that
    /// fails to cast.
    pub fn normalize_pair(&self, field: &str, value: FilterValue) -> Result<FilterValue, SearchError> {
        let (low, high) = match value {
            FilterValue::String(raw) => return self.cast_pair_from_str(field, &raw),
            FilterValue::Pair(low, high) => (*low, *high),
            FilterValue::List(items) => {
                let mut items = items.into_iter();
                match (items.next(), items.next(), items.next()) {
                    (Some(low), Some(high), None) => (low, high),
                    _ => return Err(malformed(field, "BETWEEN", BETWEEN_EXPECTED)),
                }
            }
            _ => return Err(malformed(field, "BETWEEN", BETWEEN_EXPECTED)),
        };
        Ok(FilterValue::pair(
            self.normalize_json_value(field, low)?,
            self.normalize_json_value(field, high)?,
        ))
    }
}

fn malformed(field: &str, operator: &'static str, expected: &'static str) -> SearchError {
    SearchError::MalformedList {
        field: field.to_string(),
        operator,
        expected,
    }
}
