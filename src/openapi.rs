use utoipa::OpenApi;

use crate::filtering::{Pagination, SortOption};
use crate::models::{SearchParams, SearchRequest};

/// Schemas for the search request models, to merge into an application's own
/// OpenAPI document:
///
/// ```rust,ignore
/// let mut api = ApiDoc::openapi();
/// api.merge(searchcrate::SearchApiDoc::openapi());
/// ```
#[derive(OpenApi)]
#[openapi(components(schemas(SortOption, Pagination, SearchRequest, SearchParams)))]
pub struct SearchApiDoc;
