//! # Error Handling
//!
//! Two layers of errors live here:
//!
//! - [`SearchError`] is produced by the filter compiler itself. Every variant
//!   carries the field, operator or raw value that caused it, so API consumers
//!   can correct a malformed query without guessing.
//! - [`ApiError`] is what HTTP handlers return. It maps search errors to a
//!   `400 Bad Request` with the specific message, and database or configuration
//!   failures to a sanitized `500` whose details are only logged.
//!
//! ## Logging
//!
//! Internal errors are logged using the `tracing` crate. To see them, install a
//! subscriber in your application:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt()
//!     .with_target(false)
//!     .compact()
//!     .init();
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

/// Errors raised while validating, casting or normalizing search input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("field is empty")]
    EmptyField,

    #[error("field contains invalid characters: {0:?}")]
    UnsafeIdentifier(String),

    #[error("field is not allowed: {0:?}")]
    FieldNotAllowed(String),

    #[error("operator is not allowed: {0:?}")]
    UnknownOperator(String),

    #[error("invalid sort direction: {0:?}")]
    InvalidDirection(String),

    #[error("invalid int for {field}: {raw:?}")]
    InvalidInt { field: String, raw: String },

    #[error("invalid int64 for {field}: {raw:?}")]
    InvalidInt64 { field: String, raw: String },

    #[error("invalid float64 for {field}: {raw:?}")]
    InvalidFloat { field: String, raw: String },

    #[error("invalid bool for {field}: {raw:?}")]
    InvalidBool { field: String, raw: String },

    #[error("invalid date for {field}: {raw:?} (expected YYYY-MM-DD)")]
    InvalidDate { field: String, raw: String },

    #[error("invalid time for {field}: {raw:?} (expected RFC3339 or YYYY-MM-DD HH:MM:SS)")]
    InvalidTime { field: String, raw: String },

    /// Wrong arity or shape for `IN` / `BETWEEN`.
    #[error("{operator} value for {field} must be {expected}")]
    MalformedList {
        field: String,
        operator: &'static str,
        expected: &'static str,
    },

    /// A list was supplied to an operator that compares against one value.
    #[error("{operator} value for {field} must be a single value, not a list")]
    UnexpectedList {
        field: String,
        operator: &'static str,
    },

    /// Options were built without an allowlist. Raised at construction time,
    /// never per request.
    #[error("allowed fields are required: provide a non-empty allowlist")]
    MissingAllowlist,
}

impl SearchError {
    /// Whether the error was caused by the request (as opposed to the server's
    /// configuration).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::MissingAllowlist)
    }
}

/// API error type with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - Invalid search input from the client
    BadRequest {
        /// User-facing error message
        message: String,
    },

    /// 500 Internal Server Error - Database error (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },

    /// 500 Internal Server Error - Misconfiguration or other internal failure
    Internal {
        /// User-facing generic message
        message: String,
        /// Internal error details (logged, not sent to user)
        internal: Option<String>,
    },
}

impl ApiError {
    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a 500 Internal Server Error from a database error
    ///
    /// The database error details are logged but NOT sent to the user.
    ///
    /// # Example
    /// ```rust,ignore
    /// let rows = select.all(db).await.map_err(ApiError::database)?;
    /// ```
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    /// Create a 500 Internal Server Error with optional details
    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// Get the HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the user-facing error message (sanitized)
    fn user_message(&self) -> &str {
        match self {
            Self::BadRequest { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    /// Log internal error details (not sent to user)
    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = ErrorResponse {
            error: self.user_message().to_string(),
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// Convert a [`SearchError`] to an [`ApiError`]
///
/// Request errors keep their specific message (400); configuration errors are
/// logged and hidden behind a generic 500.
impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        if err.is_client_error() {
            Self::BadRequest {
                message: err.to_string(),
            }
        } else {
            Self::Internal {
                message: "Search is not configured".to_string(),
                internal: Some(err.to_string()),
            }
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::database(err)
    }
}
