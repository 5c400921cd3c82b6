use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Page window. A `limit` of 0 means "no limit".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    /// Maximum number of rows, capped by the server's max limit.
    #[serde(default)]
    #[schema(example = 25)]
    pub limit: u64,
    /// Rows to skip.
    #[serde(default)]
    #[schema(example = 0)]
    pub offset: u64,
}

impl Pagination {
    #[must_use]
    pub const fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// The same window with `limit` clamped to `max_limit`.
    #[must_use]
    pub const fn clamped(self, max_limit: u64) -> Self {
        Self {
            limit: effective_limit(self.limit, max_limit),
            offset: self.offset,
        }
    }
}

/// Clamp a requested limit to `max_limit`.
///
/// A cap of 0 disables clamping. A requested limit of 0 ("unbounded") is left
/// as-is: the cap only ever lowers an explicit limit.
#[must_use]
pub const fn effective_limit(requested: u64, max_limit: u64) -> u64 {
    if max_limit > 0 && requested > max_limit {
        max_limit
    } else {
        requested
    }
}
