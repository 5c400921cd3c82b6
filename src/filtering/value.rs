//! Typed filter values.
//!
//! Every value that reaches a predicate is one of a closed set of variants, so
//! consumers match exhaustively instead of probing dynamic types. Query-string
//! input and JSON input both end up in this representation, which makes a
//! [`Filter`](super::Filter) built by either path interchangeable.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Int64(i64),
    Float64(f64),
    Bool(bool),
    /// A calendar day, always midnight UTC. Bound as a plain date.
    Date(DateTime<Utc>),
    Timestamp(DateTime<Utc>),
    /// Wall-clock time without an offset, for `DATETIME` / `TIMESTAMP` columns.
    NaiveTimestamp(NaiveDateTime),
    /// Operand of `IN`.
    List(Vec<FilterValue>),
    /// Operand of `BETWEEN`: `(low, high)`.
    Pair(Box<FilterValue>, Box<FilterValue>),
}

impl FilterValue {
    pub fn pair(low: impl Into<Self>, high: impl Into<Self>) -> Self {
        Self::Pair(Box::new(low.into()), Box::new(high.into()))
    }

    /// Convert loosely typed JSON into a filter value.
    ///
    /// Integers that fit in `i64` become `Int64`, other numbers `Float64`.
    /// Arrays become `List`. `null` and objects have no meaning as a filter
    /// operand and are rejected.
    ///
    /// # Errors
    /// Returns a description of the rejected JSON value.
    pub fn from_json(value: serde_json::Value) -> Result<Self, String> {
        match value {
            serde_json::Value::String(s) => Ok(Self::String(s)),
            serde_json::Value::Bool(b) => Ok(Self::Bool(b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int64)
                .or_else(|| n.as_f64().map(Self::Float64))
                .ok_or_else(|| format!("unsupported number: {n}")),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            serde_json::Value::Null => Err("null is not a valid filter value".to_string()),
            serde_json::Value::Object(_) => {
                Err("objects are not valid filter values".to_string())
            }
        }
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Int64(i) => serde_json::Value::from(*i),
            Self::Float64(f) => serde_json::Value::from(*f),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Date(_) | Self::Timestamp(_) | Self::NaiveTimestamp(_) => {
                serde_json::Value::String(self.to_string())
            }
            Self::List(items) => items.iter().map(Self::to_json).collect(),
            Self::Pair(low, high) => serde_json::Value::Array(vec![low.to_json(), high.to_json()]),
        }
    }

    /// The bound parameter for a scalar value; `None` for `List` and `Pair`.
    #[must_use]
    pub fn to_sea_value(&self) -> Option<sea_orm::Value> {
        match self {
            Self::String(s) => Some(s.clone().into()),
            Self::Int64(i) => Some((*i).into()),
            Self::Float64(f) => Some((*f).into()),
            Self::Bool(b) => Some((*b).into()),
            Self::Date(dt) => Some(dt.date_naive().into()),
            Self::Timestamp(dt) => Some((*dt).into()),
            Self::NaiveTimestamp(dt) => Some((*dt).into()),
            Self::List(_) | Self::Pair(..) => None,
        }
    }

    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Pair(..))
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int64(i) => write!(f, "{i}"),
            Self::Float64(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%d")),
            Self::Timestamp(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::NaiveTimestamp(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Pair(low, high) => write!(f, "{low},{high}"),
        }
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(value).map_err(D::Error::custom)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        Self::Int64(i)
    }
}

impl From<i32> for FilterValue {
    fn from(i: i32) -> Self {
        Self::Int64(i64::from(i))
    }
}

impl From<f64> for FilterValue {
    fn from(f: f64) -> Self {
        Self::Float64(f)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Self>> From<Vec<T>> for FilterValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}
