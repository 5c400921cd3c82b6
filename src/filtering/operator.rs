//! Operator normalization.
//!
//! This table is the single source of truth for supported operators. Adding an
//! operator (e.g. `!=`) means adding both its alias and its symbol here.

use std::fmt;

use crate::errors::SearchError;

/// Canonical comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equality (=)
    Eq,
    /// Greater than (>)
    Gt,
    /// Less than (<)
    Lt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than or equal (<=)
    Lte,
    /// Substring match (LIKE)
    Like,
    /// Set membership (IN)
    In,
    /// Inclusive range (BETWEEN)
    Between,
}

impl Operator {
    /// Parse an alias (`eq`, `gte`, ...) or a canonical symbol (`=`, `>=`, `LIKE`, ...).
    ///
    /// Surrounding whitespace is ignored and word forms are case-insensitive.
    #[must_use]
    pub fn parse(op: &str) -> Option<Self> {
        let op = op.trim();
        if op.is_empty() {
            return None;
        }
        match op.to_ascii_lowercase().as_str() {
            "eq" | "=" => Some(Self::Eq),
            "gt" | ">" => Some(Self::Gt),
            "lt" | "<" => Some(Self::Lt),
            "gte" | ">=" => Some(Self::Gte),
            "lte" | "<=" => Some(Self::Lte),
            "like" => Some(Self::Like),
            "in" => Some(Self::In),
            "between" => Some(Self::Between),
            _ => None,
        }
    }

    /// The canonical token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::In => "IN",
            Self::Between => "BETWEEN",
        }
    }

    /// Whether the operator compares against exactly one value.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !matches!(self, Self::In | Self::Between)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map an operator alias or symbol to its canonical form.
#[must_use]
pub fn normalize_operator(op: &str) -> Option<Operator> {
    Operator::parse(op)
}

/// Like [`normalize_operator`], but reports unknown operators as an error.
///
/// # Errors
/// Returns [`SearchError::UnknownOperator`] for anything outside the table.
pub fn validate_operator(op: &str) -> Result<Operator, SearchError> {
    Operator::parse(op).ok_or_else(|| SearchError::UnknownOperator(op.to_string()))
}
