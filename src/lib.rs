//! # searchcrate
//!
//! Safe search endpoints for Axum and Sea-ORM. Untrusted query strings and JSON
//! bodies are compiled into parameterized conditions, sort clauses and page
//! windows. Only allowlisted, lexically safe columns ever reach SQL.
//!
//! ```rust,ignore
//! use searchcrate::{FieldType, SearchOptions, SearchState, search_router};
//!
//! let options = SearchOptions::builder(["name", "age", "email"])
//!     .field_type("age", FieldType::Int)
//!     .max_limit(100)
//!     .build()?;
//!
//! let app = Router::new().nest(
//!     "/people",
//!     search_router::<person::Entity>(SearchState::new(db, options)),
//! );
//! ```
//!
//! The pieces are usable without the router: [`parse_query_string`] and
//! [`RequestNormalizer`] produce validated searches, and [`apply_query`] /
//! [`apply_request`] add them to any Sea-ORM `Select`.

pub mod apply;
pub mod errors;
pub mod filtering;
pub mod infer;
pub mod models;
pub mod normalize;
pub mod openapi;
pub mod options;
pub mod parser;
pub mod routes;

pub use apply::{CompiledSearch, apply_query, apply_request, compile_query, compile_request};
pub use errors::{ApiError, SearchError};
pub use filtering::{
    Filter, FilterGroup, FilterValue, Leaf, Operator, Pagination, SortDirection, SortOption,
    Validator, ValueCaster, normalize_operator,
};
pub use infer::infer_field_types;
pub use models::{SearchParams, SearchQuery, SearchRequest};
pub use normalize::{RequestNormalizer, normalize_request};
pub use openapi::SearchApiDoc;
pub use options::{FieldType, JsonPolicy, SearchConfig, SearchOptions, SearchOptionsBuilder};
pub use parser::{DroppedTerm, ParsedQuery, QueryParser, parse_query, parse_query_string};
pub use routes::{SearchState, advanced_search_handler, search_handler, search_router};
