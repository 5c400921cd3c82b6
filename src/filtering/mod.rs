//! # Filter Compilation
//!
//! Everything between untrusted input and a parameterized Sea-ORM condition.
//!
//! ## Main Components
//!
//! - **[`Operator`]**: the closed operator table (`=`, `>`, `<`, `>=`, `<=`,
//!   `LIKE`, `IN`, `BETWEEN`) and its aliases (`eq`, `gt`, ...)
//! - **[`Validator`]**: lexical safety check plus allowlist membership for
//!   every field name
//! - **[`ValueCaster`]**: raw strings and JSON values into typed
//!   [`FilterValue`]s, per configured [`FieldType`](crate::FieldType)
//! - **[`Filter`]** / **[`FilterGroup`]**: single predicates and recursive
//!   AND/OR trees, compiled into sea-query expressions and [`Condition`]s
//! - **[`SortOption`]** / **[`Pagination`]**: ordering and page windows
//!
//! ## Security
//!
//! - Field names must match `[A-Za-z0-9_.]+` **and** be allowlisted
//! - Column names are always quoted by the query builder, never interpolated
//! - Values are always bound parameters
//! - `LIKE` input has its own `%` and `_` escaped, so it can only match literally
//!
//! ## Example
//!
//! ```rust,ignore
//! use searchcrate::filtering::{Filter, FilterGroup};
//!
//! let group = FilterGroup {
//!     and: vec![Filter::new("age", "gte", 18).into()],
//!     or: vec![
//!         Filter::new("name", "=", "Alice").into(),
//!         Filter::new("name", "=", "Bob").into(),
//!     ],
//! };
//! // WHERE "age" >= 18 AND ("name" = 'Alice' OR "name" = 'Bob')
//! let rows = group.apply(person::Entity::find()).all(&db).await?;
//! ```
//!
//! [`Condition`]: sea_orm::Condition

pub mod casting;
pub mod conditions;
pub mod group;
pub mod operator;
pub mod pagination;
pub mod sort;
pub mod validator;
pub mod value;

pub use casting::{ValueCaster, split_csv};
pub use conditions::Filter;
pub use group::{FilterGroup, Leaf};
pub use operator::{Operator, normalize_operator, validate_operator};
pub use pagination::{Pagination, effective_limit};
pub use sort::{SortDirection, SortOption};
pub use validator::{Validator, is_safe_identifier};
pub use value::FilterValue;
