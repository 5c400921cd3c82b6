//! Validation and casting for the JSON (POST) search path.
//!
//! Unlike the query-string parser, the JSON path can be strict: with
//! [`JsonPolicy::Strict`] the first invalid field, operator, value or sort term
//! rejects the whole request, so a client never silently gets broader results
//! than it asked for. With [`JsonPolicy::Lenient`] an invalid filter tree is
//! dropped as a whole (never pruned to a partial tree) and invalid sort terms
//! are dropped one by one.

use tracing::debug;

use crate::errors::SearchError;
use crate::filtering::{
    Filter, FilterGroup, FilterValue, Leaf, Operator, Validator, ValueCaster, validate_operator,
};
use crate::models::SearchRequest;
use crate::options::{JsonPolicy, SearchOptions};

#[derive(Debug, Clone, Copy)]
pub struct RequestNormalizer<'a> {
    validator: Validator<'a>,
    caster: ValueCaster<'a>,
    policy: JsonPolicy,
}

impl<'a> RequestNormalizer<'a> {
    /// # Errors
    /// Returns [`SearchError::MissingAllowlist`] when the options carry no allowlist.
    pub fn new(options: &'a SearchOptions) -> Result<Self, SearchError> {
        Ok(Self {
            validator: Validator::from_options(options)?,
            caster: ValueCaster::from_options(options),
            policy: options.json_policy(),
        })
    }

    /// Normalize under the configured [`JsonPolicy`].
    ///
    /// # Errors
    /// In strict mode, the first validation or casting error.
    pub fn normalize(&self, request: SearchRequest) -> Result<SearchRequest, SearchError> {
        self.normalize_with_policy(request, self.policy)
    }

    /// Normalize under an explicit policy.
    ///
    /// On success every filter has an allowlisted field, a canonical operator
    /// and a value of the right shape and type; every sort has a direction of
    /// exactly `ASC` or `DESC`. Pagination is passed through.
    ///
    /// # Errors
    /// In strict mode, the first validation or casting error. Lenient mode
    /// never fails.
    pub fn normalize_with_policy(
        &self,
        request: SearchRequest,
        policy: JsonPolicy,
    ) -> Result<SearchRequest, SearchError> {
        let SearchRequest {
            filters,
            sort,
            pagination,
        } = request;

        let filters = match filters.map(|group| self.normalize_group(group)) {
            None => None,
            Some(Ok(group)) => Some(group),
            Some(Err(err)) if policy.is_strict() => return Err(err),
            Some(Err(err)) => {
                debug!(error = %err, "Dropped invalid filter tree");
                None
            }
        };

        let mut sorts = Vec::with_capacity(sort.len());
        for option in &sort {
            match self.validator.validate_sort_option(option) {
                Ok(normalized) => sorts.push(normalized),
                Err(err) if policy.is_strict() => return Err(err),
                Err(err) => debug!(error = %err, field = %option.field, "Dropped invalid sort term"),
            }
        }

        Ok(SearchRequest {
            filters,
            sort: sorts,
            pagination,
        })
    }

    /// Validate every field and operator of the tree, then cast every value.
    ///
    /// # Errors
    /// The first field or operator error anywhere in the tree; failing that,
    /// the first casting error.
    pub fn normalize_group(&self, group: FilterGroup) -> Result<FilterGroup, SearchError> {
        self.validator.validate_group(&group)?;
        self.cast_group(group)
    }

    fn cast_group(&self, group: FilterGroup) -> Result<FilterGroup, SearchError> {
        let cast_all = |leaves: Vec<Leaf>| {
            leaves
                .into_iter()
                .map(|leaf| self.cast_leaf(leaf))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(FilterGroup {
            and: cast_all(group.and)?,
            or: cast_all(group.or)?,
        })
    }

    fn cast_leaf(&self, leaf: Leaf) -> Result<Leaf, SearchError> {
        match leaf {
            Leaf::Filter(filter) => self.normalize_filter(filter).map(Leaf::Filter),
            Leaf::Group(group) => self.cast_group(group).map(Leaf::Group),
            Leaf::Empty => Ok(Leaf::Empty),
        }
    }

    /// Validate one filter and cast its value for its operator:
    /// `LIKE` to a string, `IN` to a list, `BETWEEN` to a pair, anything else
    /// to a single value of the field's type.
    ///
    /// # Errors
    /// Any field, operator or casting error; `UnexpectedList` when a list is
    /// given to a single-value operator.
    pub fn normalize_filter(&self, filter: Filter) -> Result<Filter, SearchError> {
        self.validator.validate_field(&filter.field)?;
        let op = validate_operator(&filter.op)?;
        let Filter { field, value, .. } = filter;

        let value = match op {
            Operator::In => self.caster.normalize_list(&field, value)?,
            Operator::Between => self.caster.normalize_pair(&field, value)?,
            _ if !value.is_scalar() => {
                return Err(SearchError::UnexpectedList {
                    field,
                    operator: op.as_str(),
                });
            }
            Operator::Like => FilterValue::String(value.to_string()),
            _ => self.caster.normalize_json_value(&field, value)?,
        };

        Ok(Filter::new(field, op.as_str(), value))
    }
}

/// Normalize a request under the options' own policy.
///
/// # Errors
/// `MissingAllowlist` for unusable options; in strict mode, the first
/// validation or casting error.
pub fn normalize_request(
    request: SearchRequest,
    options: &SearchOptions,
) -> Result<SearchRequest, SearchError> {
    RequestNormalizer::new(options)?.normalize(request)
}
