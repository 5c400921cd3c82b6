//! Recursive AND/OR filter trees.
//!
//! A group compiles to
//!
//! ```text
//! and[0] AND and[1] AND ... AND (or[0] OR or[1] OR ...)
//! ```
//!
//! Nested groups become nested [`Condition`]s, so precedence in the request is
//! exactly the precedence in SQL.

use sea_orm::{Condition, QueryFilter};
use serde::{Deserialize, Serialize};

use super::conditions::Filter;

/// A boolean tree of filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub and: Vec<Leaf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub or: Vec<Leaf>,
}

/// One node of a [`FilterGroup`].
///
/// On the wire this is `{"filter": {...}}`, `{"group": {...}}` or `{}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLeaf", into = "RawLeaf")]
pub enum Leaf {
    Filter(Filter),
    Group(FilterGroup),
    /// Contributes nothing.
    Empty,
}

#[derive(Serialize, Deserialize)]
struct RawLeaf {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<FilterGroup>,
}

impl TryFrom<RawLeaf> for Leaf {
    type Error = String;

    fn try_from(raw: RawLeaf) -> Result<Self, Self::Error> {
        match (raw.filter, raw.group) {
            (Some(_), Some(_)) => Err("a leaf holds either \"filter\" or \"group\", not both".to_string()),
            (Some(filter), None) => Ok(Self::Filter(filter)),
            (None, Some(group)) => Ok(Self::Group(group)),
            (None, None) => Ok(Self::Empty),
        }
    }
}

impl From<Leaf> for RawLeaf {
    fn from(leaf: Leaf) -> Self {
        match leaf {
            Leaf::Filter(filter) => Self {
                filter: Some(filter),
                group: None,
            },
            Leaf::Group(group) => Self {
                filter: None,
                group: Some(group),
            },
            Leaf::Empty => Self {
                filter: None,
                group: None,
            },
        }
    }
}

impl From<Filter> for Leaf {
    fn from(filter: Filter) -> Self {
        Self::Filter(filter)
    }
}

impl From<FilterGroup> for Leaf {
    fn from(group: FilterGroup) -> Self {
        Self::Group(group)
    }
}

impl Leaf {
    /// `None` when the leaf adds no restriction.
    #[must_use]
    pub fn compile(&self) -> Option<Condition> {
        match self {
            Self::Filter(filter) => filter.to_expr().map(|expr| Condition::all().add(expr)),
            Self::Group(group) => group.compile(),
            Self::Empty => None,
        }
    }
}

impl FilterGroup {
    pub fn all(leaves: impl IntoIterator<Item = impl Into<Leaf>>) -> Self {
        Self {
            and: leaves.into_iter().map(Into::into).collect(),
            or: Vec::new(),
        }
    }

    pub fn any(leaves: impl IntoIterator<Item = impl Into<Leaf>>) -> Self {
        Self {
            and: Vec::new(),
            or: leaves.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.and.is_empty() && self.or.is_empty()
    }

    /// Compile the tree. `None` means the group restricts nothing.
    ///
    /// OR branches that compile to nothing are skipped rather than turning the
    /// whole OR block into "match everything".
    #[must_use]
    pub fn compile(&self) -> Option<Condition> {
        let mut condition = Condition::all();
        let mut restricted = false;

        for leaf in &self.and {
            if let Some(compiled) = leaf.compile() {
                condition = condition.add(compiled);
                restricted = true;
            }
        }

        let branches: Vec<Condition> = self.or.iter().filter_map(Leaf::compile).collect();
        if !branches.is_empty() {
            let or_block = branches.into_iter().fold(Condition::any(), Condition::add);
            condition = condition.add(or_block);
            restricted = true;
        }

        restricted.then_some(condition)
    }

    /// Like [`compile`](Self::compile), with "no restriction" as an empty
    /// conjunction.
    #[must_use]
    pub fn to_condition(&self) -> Condition {
        self.compile().unwrap_or_else(Condition::all)
    }

    #[must_use]
    pub fn apply<Q: QueryFilter>(&self, query: Q) -> Q {
        match self.compile() {
            Some(condition) => query.filter(condition),
            None => query,
        }
    }
}
