use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::filtering::{Filter, FilterGroup, Pagination, SortOption};

/// A parsed GET search: flat filters (always AND-ed), sorts and a page window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub filters: Vec<Filter>,
    pub sorts: Vec<SortOption>,
    pub pagination: Pagination,
}

/// Body of an advanced (POST) search.
///
/// ```json
/// {
///   "filters": {
///     "and": [{"filter": {"field": "age", "op": "gte", "value": 18}}],
///     "or": [
///       {"filter": {"field": "name", "op": "=", "value": "Alice"}},
///       {"filter": {"field": "name", "op": "=", "value": "Bob"}}
///     ]
///   },
///   "sort": [{"field": "age", "direction": "desc"}],
///   "pagination": {"limit": 25, "offset": 0}
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// Boolean filter tree: `{"and": [Leaf], "or": [Leaf]}` where a leaf is
    /// `{"filter": {"field", "op", "value"}}`, `{"group": {...}}` or `{}`.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub filters: Option<FilterGroup>,
    #[serde(default)]
    pub sort: Vec<SortOption>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Query parameters accepted by the GET search endpoint.
///
/// # Filtering
/// Each filter is its own parameter, `filter[<field>]` or `filter[<field>:<op>]`.
/// The operator defaults to `=`:
/// ```text
/// GET /people?filter[name]=Alice
/// GET /people?filter[age:gte]=18
/// GET /people?filter[name:in]=Alice,Bob
/// GET /people?filter[age:between]=20,28
/// GET /people?filter[email:like]=gmail
/// ```
///
/// # Sorting
/// Comma-separated fields, `-` for descending: `sort=-age,name`.
///
/// # Pagination
/// `limit` and `offset`; a limit above the server's maximum is lowered to it.
#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Sort fields, `-` prefix for descending.
    #[param(example = "-age,name")]
    pub sort: Option<String>,
    /// Maximum number of rows.
    #[param(example = 25)]
    pub limit: Option<u64>,
    /// Rows to skip.
    #[param(example = 0)]
    pub offset: Option<u64>,
}
