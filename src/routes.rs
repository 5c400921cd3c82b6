//! Generic Axum handlers for searching any Sea-ORM entity.
//!
//! ```rust,ignore
//! let options = SearchOptions::builder(["name", "age", "email"])
//!     .infer_from_entity::<person::Entity>()
//!     .max_limit(100)
//!     .build()?;
//! let app = Router::new().nest(
//!     "/people",
//!     search_router::<person::Entity>(SearchState::new(db, options)),
//! );
//! // GET  /people?filter[age:gte]=18&sort=-age&limit=10
//! // POST /people/search  {"filters": {...}, "sort": [...], "pagination": {...}}
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    routing::{get, post},
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;

use crate::apply::{apply_query, apply_request};
use crate::errors::ApiError;
use crate::models::SearchRequest;
use crate::normalize::RequestNormalizer;
use crate::options::SearchOptions;
use crate::parser::parse_query_string;

/// Shared handler state: the connection and the frozen search options.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub db: DatabaseConnection,
    pub options: Arc<SearchOptions>,
}

impl SearchState {
    #[must_use]
    pub fn new(db: DatabaseConnection, options: SearchOptions) -> Self {
        Self {
            db,
            options: Arc::new(options),
        }
    }
}

/// `GET` search driven by the query string. Invalid terms are ignored.
///
/// # Errors
/// 500 when the options are unusable or the query fails.
pub async fn search_handler<E>(
    State(state): State<SearchState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<E::Model>>, ApiError>
where
    E: EntityTrait,
    E::Model: Serialize,
{
    let query = parse_query_string(raw.as_deref().unwrap_or_default(), &state.options)?;
    let rows = apply_query(E::find(), &query, &state.options)
        .all(&state.db)
        .await?;
    Ok(Json(rows))
}

/// `POST` search driven by a JSON [`SearchRequest`].
///
/// # Errors
/// 400 naming the offending field, operator or value when strict JSON
/// validation fails; 500 when the options are unusable or the query fails.
pub async fn advanced_search_handler<E>(
    State(state): State<SearchState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<E::Model>>, ApiError>
where
    E: EntityTrait,
    E::Model: Serialize,
{
    let request = RequestNormalizer::new(&state.options)?.normalize(request)?;
    let rows = apply_request(E::find(), &request, &state.options)
        .all(&state.db)
        .await?;
    Ok(Json(rows))
}

/// `GET /` and `POST /search` for entity `E`.
pub fn search_router<E>(state: SearchState) -> Router
where
    E: EntityTrait,
    E::Model: Serialize,
{
    Router::new()
        .route("/", get(search_handler::<E>))
        .route("/search", post(advanced_search_handler::<E>))
        .with_state(state)
}
