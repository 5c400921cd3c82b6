use sea_orm::{
    QueryFilter, Value,
    sea_query::{Alias, ColumnRef, Expr, IntoColumnRef, LikeExpr, SimpleExpr},
};
use serde::{Deserialize, Serialize};

use super::casting::split_csv;
use super::operator::Operator;
use super::validator::is_safe_identifier;
use super::value::FilterValue;

/// Escape LIKE wildcards so user input only ever matches literally.
///
/// `\` (the escape character itself) is escaped first, then `%` and `_`.
fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Column reference for `column`, `table.column` or `schema.table.column`.
/// Each segment is quoted separately by the query builder.
pub(crate) fn column_ref(field: &str) -> Option<ColumnRef> {
    let parts: Vec<&str> = field.split('.').collect();
    if parts.iter().any(|part| part.is_empty()) {
        return None;
    }
    match parts.as_slice() {
        [column] => Some(Alias::new(*column).into_column_ref()),
        [table, column] => Some((Alias::new(*table), Alias::new(*column)).into_column_ref()),
        [schema, table, column] => Some(
            (Alias::new(*schema), Alias::new(*table), Alias::new(*column)).into_column_ref(),
        ),
        _ => None,
    }
}

/// A single predicate: `field op value`.
///
/// `op` may be an alias or a canonical symbol. Compiling a filter never fails;
/// a filter that cannot be compiled safely adds no restriction. Validate with
/// [`Validator`](super::Validator) first when the input is untrusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    #[serde(default)]
    pub op: String,
    pub value: FilterValue,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            op: op.into(),
            value: value.into(),
        }
    }

    /// Compile into a parameterized expression.
    ///
    /// Returns `None` (no restriction) when the field is empty or unsafe, the
    /// operator is unknown, or the value does not fit the operator.
    #[must_use]
    pub fn to_expr(&self) -> Option<SimpleExpr> {
        if self.field.trim().is_empty() || !is_safe_identifier(&self.field) {
            return None;
        }
        let op = Operator::parse(&self.op)?;
        let column = Expr::col(column_ref(&self.field)?);

        let expr = match op {
            Operator::Eq => column.eq(self.value.to_sea_value()?),
            Operator::Gt => column.gt(self.value.to_sea_value()?),
            Operator::Lt => column.lt(self.value.to_sea_value()?),
            Operator::Gte => column.gte(self.value.to_sea_value()?),
            Operator::Lte => column.lte(self.value.to_sea_value()?),
            Operator::Like => {
                if !self.value.is_scalar() {
                    return None;
                }
                // Substring match: %value% with the value's own wildcards escaped
                let pattern = format!("%{}%", escape_like_wildcards(&self.value.to_string()));
                column.like(LikeExpr::new(pattern).escape('\\'))
            }
            Operator::In => column.is_in(self.in_values()?),
            Operator::Between => {
                let (low, high) = self.between_bounds()?;
                column.between(low, high)
            }
        };
        Some(expr)
    }

    /// Members of an `IN` set. An empty set is valid and matches nothing.
    fn in_values(&self) -> Option<Vec<Value>> {
        match &self.value {
            FilterValue::String(raw) => Some(
                split_csv(raw)
                    .into_iter()
                    .map(|part| Value::from(part.to_string()))
                    .collect(),
            ),
            FilterValue::List(items) => items.iter().map(FilterValue::to_sea_value).collect(),
            FilterValue::Pair(..) => None,
            scalar => scalar.to_sea_value().map(|value| vec![value]),
        }
    }

    /// Bounds of a `BETWEEN`; anything other than exactly two scalars is `None`.
    fn between_bounds(&self) -> Option<(Value, Value)> {
        match &self.value {
            FilterValue::Pair(low, high) => Some((low.to_sea_value()?, high.to_sea_value()?)),
            FilterValue::List(items) => match items.as_slice() {
                [low, high] => Some((low.to_sea_value()?, high.to_sea_value()?)),
                _ => None,
            },
            FilterValue::String(raw) => match split_csv(raw).as_slice() {
                [low, high] => Some((Value::from(low.to_string()), Value::from(high.to_string()))),
                _ => None,
            },
            _ => None,
        }
    }

    /// Add this filter to a query, or leave the query untouched if the filter
    /// compiles to no restriction.
    #[must_use]
    pub fn apply<Q: QueryFilter>(&self, query: Q) -> Q {
        match self.to_expr() {
            Some(expr) => query.filter(expr),
            None => query,
        }
    }
}
