//! Search configuration.
//!
//! [`SearchOptions`] is built once at startup and is read-only afterwards: the
//! builder is consumed by [`SearchOptionsBuilder::build`] and the resulting value
//! exposes no setters. Share it between handlers as `Arc<SearchOptions>`.
//!
//! ```rust,ignore
//! let options = SearchOptions::builder(["name", "age", "email"])
//!     .field_type("age", FieldType::Int)
//!     .max_limit(50)
//!     .build()?;
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};

use crate::errors::SearchError;
use crate::infer::infer_field_types;

/// The expected type of a searchable field, used to cast query-string values
/// and to normalize JSON values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Values are passed through unchanged.
    #[default]
    String,
    Int,
    Int64,
    Float64,
    Bool,
    /// `YYYY-MM-DD`, stored as midnight UTC.
    Date,
    /// RFC3339 or `YYYY-MM-DD HH:MM:SS`, compared as an absolute instant.
    Time,
    /// Same input as `Time`, compared as UTC wall-clock time for columns that
    /// store no offset.
    DateTime,
}

impl FieldType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "int" => Ok(Self::Int),
            "int64" => Ok(Self::Int64),
            "float64" => Ok(Self::Float64),
            "bool" => Ok(Self::Bool),
            "date" => Ok(Self::Date),
            "time" => Ok(Self::Time),
            "datetime" => Ok(Self::DateTime),
            other => Err(format!("unknown field type: {other:?}")),
        }
    }
}

/// How the JSON (POST) path reacts to an invalid term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonPolicy {
    /// The first invalid field, operator, value or sort aborts the request.
    #[default]
    Strict,
    /// Invalid filter trees and sort terms are dropped and processing continues.
    Lenient,
}

impl JsonPolicy {
    #[must_use]
    pub const fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Lenient }
    }

    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// Immutable search configuration shared by every request.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    allowed_fields: HashSet<String>,
    field_types: HashMap<String, FieldType>,
    json_policy: JsonPolicy,
    max_limit: u64,
}

impl SearchOptions {
    /// Start building options from the allowlist of searchable fields.
    pub fn builder<I, S>(allowed_fields: I) -> SearchOptionsBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SearchOptionsBuilder::new(allowed_fields)
    }

    /// Build options from a deserialized [`SearchConfig`].
    ///
    /// # Errors
    /// Returns [`SearchError::MissingAllowlist`] when `allowed_fields` is empty.
    pub fn from_config(config: SearchConfig) -> Result<Self, SearchError> {
        Self::builder(config.allowed_fields)
            .field_types(config.field_types)
            .strict_json(config.strict_json)
            .max_limit(config.max_limit)
            .build()
    }

    #[must_use]
    pub const fn allowed_fields(&self) -> &HashSet<String> {
        &self.allowed_fields
    }

    #[must_use]
    pub fn is_allowed(&self, field: &str) -> bool {
        self.allowed_fields.contains(field)
    }

    #[must_use]
    pub const fn field_types(&self) -> &HashMap<String, FieldType> {
        &self.field_types
    }

    /// The declared type of `field`, if any.
    #[must_use]
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.field_types.get(field).copied()
    }

    #[must_use]
    pub const fn json_policy(&self) -> JsonPolicy {
        self.json_policy
    }

    /// Maximum page size; 0 means no cap.
    #[must_use]
    pub const fn max_limit(&self) -> u64 {
        self.max_limit
    }
}

/// Builder for [`SearchOptions`]. Consumed by [`build`](Self::build).
#[derive(Debug, Clone)]
#[must_use]
pub struct SearchOptionsBuilder {
    allowed_fields: HashSet<String>,
    field_types: HashMap<String, FieldType>,
    json_policy: JsonPolicy,
    max_limit: u64,
}

impl SearchOptionsBuilder {
    fn new<I, S>(allowed_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed_fields = allowed_fields
            .into_iter()
            .map(Into::into)
            .filter(|field: &String| !field.is_empty())
            .collect();
        Self {
            allowed_fields,
            field_types: HashMap::new(),
            json_policy: JsonPolicy::Strict,
            max_limit: 0,
        }
    }

    /// Declare the type of a single field.
    pub fn field_type(mut self, field: impl Into<String>, field_type: FieldType) -> Self {
        self.field_types.insert(field.into(), field_type);
        self
    }

    /// Declare several field types at once. Later declarations win.
    pub fn field_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldType)>,
        S: Into<String>,
    {
        self.field_types
            .extend(types.into_iter().map(|(field, ty)| (field.into(), ty)));
        self
    }

    /// Infer field types for allowlisted columns of a Sea-ORM entity.
    ///
    /// Types declared explicitly (before or after this call) take precedence.
    pub fn infer_from_entity<E: EntityTrait>(mut self) -> Self {
        for (field, ty) in infer_field_types::<E>(&self.allowed_fields) {
            self.field_types.entry(field).or_insert(ty);
        }
        self
    }

    pub const fn json_policy(mut self, policy: JsonPolicy) -> Self {
        self.json_policy = policy;
        self
    }

    pub const fn strict_json(self, strict: bool) -> Self {
        self.json_policy(JsonPolicy::from_strict(strict))
    }

    /// Cap every page size at `max`. 0 disables the cap.
    pub const fn max_limit(mut self, max: u64) -> Self {
        self.max_limit = max;
        self
    }

    /// Freeze the configuration.
    ///
    /// # Errors
    /// Returns [`SearchError::MissingAllowlist`] when no fields are allowed.
    pub fn build(self) -> Result<SearchOptions, SearchError> {
        if self.allowed_fields.is_empty() {
            return Err(SearchError::MissingAllowlist);
        }
        Ok(SearchOptions {
            allowed_fields: self.allowed_fields,
            field_types: self.field_types,
            json_policy: self.json_policy,
            max_limit: self.max_limit,
        })
    }
}

/// Serializable form of [`SearchOptions`], for loading from a config file.
///
/// ```json
/// {
///   "allowed_fields": ["name", "age"],
///   "field_types": {"age": "int"},
///   "strict_json": true,
///   "max_limit": 100
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    pub allowed_fields: Vec<String>,
    #[serde(default)]
    pub field_types: HashMap<String, FieldType>,
    #[serde(default = "default_strict_json")]
    pub strict_json: bool,
    #[serde(default)]
    pub max_limit: u64,
}

const fn default_strict_json() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let options = SearchOptions::builder(["name"]).build().unwrap();
        assert!(options.is_allowed("name"));
        assert!(!options.is_allowed("age"));
        assert_eq!(options.json_policy(), JsonPolicy::Strict);
        assert_eq!(options.max_limit(), 0);
        assert_eq!(options.field_type("name"), None);
    }

    #[test]
    fn test_empty_allowlist_is_rejected() {
        let err = SearchOptions::builder(Vec::<String>::new()).build().unwrap_err();
        assert_eq!(err, SearchError::MissingAllowlist);

        // Empty names are discarded, so an allowlist of only "" is empty too
        let err = SearchOptions::builder([""]).build().unwrap_err();
        assert_eq!(err, SearchError::MissingAllowlist);
    }

    #[test]
    fn test_field_types_later_declaration_wins() {
        let options = SearchOptions::builder(["age"])
            .field_type("age", FieldType::Int)
            .field_types([("age", FieldType::Int64)])
            .build()
            .unwrap();
        assert_eq!(options.field_type("age"), Some(FieldType::Int64));
    }

    #[test]
    fn test_strict_json_toggle() {
        let options = SearchOptions::builder(["a"]).strict_json(false).build().unwrap();
        assert_eq!(options.json_policy(), JsonPolicy::Lenient);
        assert!(!options.json_policy().is_strict());
    }

    #[test]
    fn test_from_config_json() {
        let config: SearchConfig = serde_json::from_str(
            r#"{"allowed_fields": ["name", "age", "born"],
                "field_types": {"age": "int", "born": "date"},
                "max_limit": 25}"#,
        )
        .unwrap();
        let options = SearchOptions::from_config(config).unwrap();

        assert_eq!(options.field_type("age"), Some(FieldType::Int));
        assert_eq!(options.field_type("born"), Some(FieldType::Date));
        assert_eq!(options.max_limit(), 25);
        assert_eq!(options.json_policy(), JsonPolicy::Strict, "strict by default");
    }

    #[test]
    fn test_from_config_rejects_unknown_type() {
        let result: Result<SearchConfig, _> =
            serde_json::from_str(r#"{"allowed_fields": ["a"], "field_types": {"a": "uuid"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_field_type_from_str() {
        assert_eq!("INT64".parse::<FieldType>(), Ok(FieldType::Int64));
        assert_eq!(" time ".parse::<FieldType>(), Ok(FieldType::Time));
        assert_eq!("DateTime".parse::<FieldType>(), Ok(FieldType::DateTime));
        assert_eq!(FieldType::DateTime.to_string(), "datetime");
        assert!("decimal".parse::<FieldType>().is_err());
        assert_eq!(FieldType::Float64.to_string(), "float64");
    }

    #[test]
    fn test_options_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchOptions>();
    }
}
