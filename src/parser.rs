//! Query-string parsing for the GET search path.
//!
//! Grammar:
//!
//! ```text
//! filter[<field>]=<value>          op defaults to "="
//! filter[<field>:<op>]=<value>     op is an alias or symbol, e.g. gte, in, between
//! sort=<[-]field>(,<[-]field>)*    "-" means descending
//! limit=<n>&offset=<n>
//! ```
//!
//! Parsing is permissive: a term that names an unknown field, uses an unknown
//! operator or carries a value that does not cast is dropped and the rest of the
//! query still applies. `limit`/`offset` that do not parse become 0. Only a
//! configuration error fails the parse.

use std::collections::HashSet;

use tracing::debug;

use crate::errors::SearchError;
use crate::filtering::{
    Filter, Operator, Pagination, SortOption, Validator, ValueCaster, validate_operator,
};
use crate::models::SearchQuery;
use crate::options::SearchOptions;

const FILTER_PREFIX: &str = "filter[";

/// A query-string term that was ignored, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedTerm {
    /// The parameter name, e.g. `filter[age:gte]` or `sort`.
    pub key: String,
    pub reason: SearchError,
}

/// The result of [`QueryParser::parse`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQuery {
    pub query: SearchQuery,
    /// Terms that were ignored, in the order they were seen.
    pub dropped: Vec<DroppedTerm>,
}

impl ParsedQuery {
    #[must_use]
    pub fn into_query(self) -> SearchQuery {
        self.query
    }
}

/// Parses query-string pairs against a set of [`SearchOptions`].
#[derive(Debug, Clone, Copy)]
pub struct QueryParser<'a> {
    validator: Validator<'a>,
    caster: ValueCaster<'a>,
    max_limit: u64,
}

impl<'a> QueryParser<'a> {
    /// # Errors
    /// Returns [`SearchError::MissingAllowlist`] when the options carry no allowlist.
    pub fn new(options: &'a SearchOptions) -> Result<Self, SearchError> {
        Ok(Self {
            validator: Validator::from_options(options)?,
            caster: ValueCaster::from_options(options),
            max_limit: options.max_limit(),
        })
    }

    /// Parse decoded `(key, value)` pairs. For a repeated key only the first
    /// value is used.
    pub fn parse<I, K, V>(&self, pairs: I) -> ParsedQuery
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut parsed = ParsedQuery::default();
        let mut limit = 0;
        let mut offset = 0;

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            if !seen.insert(key.to_string()) {
                continue;
            }
            match key {
                "sort" => self.parse_sort(value, &mut parsed),
                "limit" => limit = value.parse().unwrap_or(0),
                "offset" => offset = value.parse().unwrap_or(0),
                _ => {
                    if let Some(term) = key.strip_prefix(FILTER_PREFIX) {
                        match self.parse_filter(term, value) {
                            Ok(Some(filter)) => parsed.query.filters.push(filter),
                            Ok(None) => {}
                            Err(reason) => drop_term(&mut parsed, key, reason),
                        }
                    }
                }
            }
        }

        parsed.query.pagination = Pagination::new(limit, offset).clamped(self.max_limit);
        parsed
    }

    /// `term` is what follows `filter[`: `field]` or `field:op]`.
    fn parse_filter(&self, term: &str, raw: &str) -> Result<Option<Filter>, SearchError> {
        let inner = term.strip_suffix(']').unwrap_or(term);
        if inner.is_empty() {
            return Ok(None);
        }

        let (field, op) = match inner.split_once(':') {
            Some((field, op)) if !op.trim().is_empty() => (field.trim(), op.trim()),
            Some((field, _)) => (field.trim(), "="),
            None => (inner.trim(), "="),
        };

        self.validator.validate_field(field)?;
        let op = validate_operator(op)?;
        let value = match op {
            Operator::In => self.caster.cast_list_from_str(field, raw)?,
            Operator::Between => self.caster.cast_pair_from_str(field, raw)?,
            _ => self.caster.cast_from_str(field, raw)?,
        };

        Ok(Some(Filter::new(field, op.as_str(), value)))
    }

    fn parse_sort(&self, raw: &str, parsed: &mut ParsedQuery) {
        for term in raw.split(',').map(str::trim).filter(|term| !term.is_empty()) {
            let sort = SortOption::from_query_term(term);
            match self.validator.validate_field(&sort.field) {
                Ok(()) => parsed.query.sorts.push(sort),
                Err(reason) => drop_term(parsed, "sort", reason),
            }
        }
    }
}

fn drop_term(parsed: &mut ParsedQuery, key: &str, reason: SearchError) {
    debug!(key = %key, reason = %reason, "Dropped search term");
    parsed.dropped.push(DroppedTerm {
        key: key.to_string(),
        reason,
    });
}

/// Parse decoded query pairs, silently dropping invalid terms.
///
/// # Errors
/// Returns [`SearchError::MissingAllowlist`] when the options carry no allowlist.
pub fn parse_query<I, K, V>(pairs: I, options: &SearchOptions) -> Result<SearchQuery, SearchError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    Ok(QueryParser::new(options)?.parse(pairs).into_query())
}

/// Parse a raw (percent-encoded) query string, with or without a leading `?`.
///
/// # Errors
/// Returns [`SearchError::MissingAllowlist`] when the options carry no allowlist.
pub fn parse_query_string(raw: &str, options: &SearchOptions) -> Result<SearchQuery, SearchError> {
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    parse_query(url::form_urlencoded::parse(raw.as_bytes()), options)
}
