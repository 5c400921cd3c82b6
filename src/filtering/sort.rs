use sea_orm::sea_query::Order;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::SearchError;

/// A sort term.
///
/// `direction` is kept as received on the wire so the lenient JSON path can
/// drop a bad term instead of rejecting the whole body; validation normalizes
/// it to exactly `"ASC"` or `"DESC"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SortOption {
    /// Column to sort by. Must be in the allowlist.
    #[schema(example = "created_at")]
    pub field: String,
    /// `ASC` or `DESC`, any casing.
    #[serde(default)]
    #[schema(example = "DESC")]
    pub direction: String,
}

impl SortOption {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction: direction.as_str().to_string(),
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Parse one term of the `sort` query parameter: `field` or `-field`.
    #[must_use]
    pub fn from_query_term(term: &str) -> Self {
        let term = term.trim();
        term.strip_prefix('-')
            .map_or_else(|| Self::asc(term), Self::desc)
    }
}

/// Validated sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive match on `asc` / `desc`.
    ///
    /// # Errors
    /// Returns [`SearchError::InvalidDirection`] for anything else, including
    /// an empty string.
    pub fn parse(direction: &str) -> Result<Self, SearchError> {
        match direction.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(SearchError::InvalidDirection(direction.to_string())),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    #[must_use]
    pub const fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direction_asc() {
        assert_eq!(SortDirection::parse("ASC"), Ok(SortDirection::Asc));
        assert_eq!(SortDirection::parse("asc"), Ok(SortDirection::Asc));
        assert_eq!(SortDirection::parse("Asc"), Ok(SortDirection::Asc));
    }

    #[test]
    fn test_parse_direction_desc() {
        assert_eq!(SortDirection::parse("DESC"), Ok(SortDirection::Desc));
        assert_eq!(SortDirection::parse("desc"), Ok(SortDirection::Desc));
        assert_eq!(SortDirection::parse(" Desc "), Ok(SortDirection::Desc));
    }

    #[test]
    fn test_parse_direction_invalid() {
        for bad in ["", "random", "ascending", "up"] {
            assert_eq!(
                SortDirection::parse(bad),
                Err(SearchError::InvalidDirection(bad.to_string()))
            );
        }
    }

    #[test]
    fn test_direction_to_order() {
        assert_eq!(SortDirection::Asc.order(), Order::Asc);
        assert_eq!(SortDirection::Desc.order(), Order::Desc);
    }

    #[test]
    fn test_query_term() {
        assert_eq!(SortOption::from_query_term("name"), SortOption::asc("name"));
        assert_eq!(SortOption::from_query_term("-age"), SortOption::desc("age"));
        assert_eq!(SortOption::from_query_term(" -age "), SortOption::desc("age"));
    }

    #[test]
    fn test_missing_direction_deserializes_empty() {
        let sort: SortOption = serde_json::from_str(r#"{"field": "name"}"#).unwrap();
        assert_eq!(sort.direction, "");
    }
}
