//! Allowlist validation for fields, operators and sorts.
//!
//! The validator is the only gatekeeper deciding which identifiers may reach a
//! query. Checks always run in the same order: emptiness, lexical safety, then
//! allowlist membership, so an attacker-controlled string is shape-checked before
//! it is ever used as a lookup key.

use std::collections::HashSet;

use super::conditions::Filter;
use super::group::{FilterGroup, Leaf};
use super::operator::validate_operator;
use super::sort::{SortDirection, SortOption};
use crate::errors::SearchError;
use crate::options::SearchOptions;

/// Whether every character of `field` is in `[A-Za-z0-9_.]` (and there is at
/// least one). Dotted names like `users.email` pass; whitespace, quotes,
/// parentheses and semicolons do not.
#[must_use]
pub fn is_safe_identifier(field: &str) -> bool {
    !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Validates identifiers against a borrowed allowlist.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    allowed: &'a HashSet<String>,
}

impl<'a> Validator<'a> {
    /// # Errors
    /// Returns [`SearchError::MissingAllowlist`] when `allowed` is empty.
    pub fn new(allowed: &'a HashSet<String>) -> Result<Self, SearchError> {
        if allowed.is_empty() {
            return Err(SearchError::MissingAllowlist);
        }
        Ok(Self { allowed })
    }

    /// # Errors
    /// Returns [`SearchError::MissingAllowlist`] when the options carry no allowlist.
    pub fn from_options(options: &'a SearchOptions) -> Result<Self, SearchError> {
        Self::new(options.allowed_fields())
    }

    /// # Errors
    /// `EmptyField`, `UnsafeIdentifier` or `FieldNotAllowed`, in that order.
    pub fn validate_field(&self, field: &str) -> Result<(), SearchError> {
        if field.trim().is_empty() {
            return Err(SearchError::EmptyField);
        }
        if !is_safe_identifier(field) {
            return Err(SearchError::UnsafeIdentifier(field.to_string()));
        }
        if !self.allowed.contains(field) {
            return Err(SearchError::FieldNotAllowed(field.to_string()));
        }
        Ok(())
    }

    /// Validate the field and return the option with its direction normalized
    /// to `ASC` or `DESC`.
    ///
    /// # Errors
    /// Any field error, or `InvalidDirection`.
    pub fn validate_sort_option(&self, sort: &SortOption) -> Result<SortOption, SearchError> {
        self.validate_field(&sort.field)?;
        let direction = SortDirection::parse(&sort.direction)?;
        Ok(SortOption::new(sort.field.clone(), direction))
    }

    /// Validate the field and canonicalize the operator. The value is left
    /// untouched; casting is the caster's job.
    ///
    /// # Errors
    /// Any field error, or `UnknownOperator`.
    pub fn validate_filter(&self, filter: &Filter) -> Result<Filter, SearchError> {
        self.validate_field(&filter.field)?;
        let op = validate_operator(&filter.op)?;
        Ok(Filter {
            field: filter.field.clone(),
            op: op.as_str().to_string(),
            value: filter.value.clone(),
        })
    }

    /// Validate every field and operator in a filter tree, depth first, `and`
    /// before `or`. Values are not inspected.
    ///
    /// # Errors
    /// The first field or operator error found.
    pub fn validate_group(&self, group: &FilterGroup) -> Result<(), SearchError> {
        for leaf in group.and.iter().chain(&group.or) {
            match leaf {
                Leaf::Filter(filter) => {
                    self.validate_field(&filter.field)?;
                    validate_operator(&filter.op)?;
                }
                Leaf::Group(nested) => self.validate_group(nested)?,
                Leaf::Empty => {}
            }
        }
        Ok(())
    }
}
