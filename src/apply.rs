//! Turning parsed searches into Sea-ORM queries.
//!
//! Both search paths end in a [`CompiledSearch`]: a condition, an ordered list
//! of sort columns and a page window. It can be inspected, or applied to any
//! query that supports filtering, ordering and limits:
//!
//! ```rust,ignore
//! let query = parse_query_string(raw, &options)?;
//! let rows = apply_query(person::Entity::find(), &query, &options)
//!     .all(&db)
//!     .await?;
//! ```

use sea_orm::{
    Condition, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Order, SimpleExpr},
};

use crate::filtering::conditions::column_ref;
use crate::filtering::{FilterGroup, Pagination, SortDirection, SortOption, Validator, effective_limit};
use crate::models::{SearchQuery, SearchRequest};
use crate::options::SearchOptions;

/// A search ready to be applied to a query.
#[derive(Debug, Clone, Default)]
pub struct CompiledSearch {
    /// `None` when nothing restricts the rows.
    pub condition: Option<Condition>,
    /// Sort columns, in order of precedence.
    pub order_by: Vec<(String, SortDirection)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl CompiledSearch {
    /// The condition, or an empty conjunction when nothing restricts the rows.
    #[must_use]
    pub fn condition(&self) -> Condition {
        self.condition.clone().unwrap_or_else(Condition::all)
    }

    /// Sort columns with their sea-query order.
    pub fn orders(&self) -> impl Iterator<Item = (&str, Order)> {
        self.order_by
            .iter()
            .map(|(field, direction)| (field.as_str(), direction.order()))
    }

    #[must_use]
    pub fn apply<Q>(&self, query: Q) -> Q
    where
        Q: QueryFilter + QueryOrder + QuerySelect,
    {
        let mut query = match &self.condition {
            Some(condition) => query.filter(condition.clone()),
            None => query,
        };
        for (field, order) in self.orders() {
            if let Some(column) = column_ref(field) {
                query = query.order_by(SimpleExpr::Column(column), order);
            }
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = self.offset {
            query = query.offset(offset);
        }
        query
    }
}

/// Sorts that still pass validation, with normalized directions. Without a
/// usable allowlist no sort passes.
fn validated_sorts(sorts: &[SortOption], options: &SearchOptions) -> Vec<(String, SortDirection)> {
    let Ok(validator) = Validator::from_options(options) else {
        return Vec::new();
    };
    sorts
        .iter()
        .filter_map(|sort| {
            validator.validate_field(&sort.field).ok()?;
            let direction = SortDirection::parse(&sort.direction).ok()?;
            Some((sort.field.clone(), direction))
        })
        .collect()
}

fn page_window(pagination: Pagination, options: &SearchOptions) -> (Option<u64>, Option<u64>) {
    let limit = effective_limit(pagination.limit, options.max_limit());
    (
        (limit > 0).then_some(limit),
        (pagination.offset > 0).then_some(pagination.offset),
    )
}

/// Compile a parsed GET search. Filters are AND-ed in order; filters that
/// compile to no restriction are skipped.
#[must_use]
pub fn compile_query(query: &SearchQuery, options: &SearchOptions) -> CompiledSearch {
    let mut condition = Condition::all();
    let mut restricted = false;
    for expr in query.filters.iter().filter_map(|filter| filter.to_expr()) {
        condition = condition.add(expr);
        restricted = true;
    }

    let (limit, offset) = page_window(query.pagination, options);
    CompiledSearch {
        condition: restricted.then_some(condition),
        order_by: validated_sorts(&query.sorts, options),
        limit,
        offset,
    }
}

/// Compile a JSON search. Normalize the request with
/// [`RequestNormalizer`](crate::RequestNormalizer) first when it came from a
/// client.
#[must_use]
pub fn compile_request(request: &SearchRequest, options: &SearchOptions) -> CompiledSearch {
    let (limit, offset) = page_window(request.pagination, options);
    CompiledSearch {
        condition: request.filters.as_ref().and_then(FilterGroup::compile),
        order_by: validated_sorts(&request.sort, options),
        limit,
        offset,
    }
}

/// Apply a parsed GET search to `query`.
#[must_use]
pub fn apply_query<Q>(query: Q, search: &SearchQuery, options: &SearchOptions) -> Q
where
    Q: QueryFilter + QueryOrder + QuerySelect,
{
    compile_query(search, options).apply(query)
}

/// Apply a JSON search to `query`.
#[must_use]
pub fn apply_request<Q>(query: Q, request: &SearchRequest, options: &SearchOptions) -> Q
where
    Q: QueryFilter + QueryOrder + QuerySelect,
{
    compile_request(request, options).apply(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::{Filter, FilterValue};
    use sea_orm::{DbBackend, EntityTrait, QueryTrait};

    mod person {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "people")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            pub name: String,
            pub age: i32,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    fn options() -> SearchOptions {
        SearchOptions::builder(["name", "age", "people.age"])
            .max_limit(50)
            .build()
            .unwrap()
    }

    fn sql(search: &CompiledSearch) -> String {
        search
            .apply(person::Entity::find())
            .build(DbBackend::Sqlite)
            .sql
    }

    #[test]
    fn test_empty_query_compiles_to_nothing() {
        let compiled = compile_query(&SearchQuery::default(), &options());
        assert!(compiled.condition.is_none());
        assert!(compiled.order_by.is_empty());
        assert_eq!((compiled.limit, compiled.offset), (None, None));

        let sql = sql(&compiled);
        assert!(!sql.contains("WHERE"), "{sql}");
        assert!(!sql.contains("LIMIT"), "{sql}");
    }

    #[test]
    fn test_query_filters_are_conjoined() {
        let query = SearchQuery {
            filters: vec![
                Filter::new("age", ">=", 18),
                Filter::new("age", "between", "1"),
                Filter::new("name", "like", "al"),
            ],
            ..SearchQuery::default()
        };
        let sql = sql(&compile_query(&query, &options()));
        assert!(sql.contains(r#"WHERE "age" >= ? AND "name" LIKE ?"#), "{sql}");
        assert!(!sql.contains("BETWEEN"), "{sql}");
    }

    #[test]
    fn test_sorts_are_revalidated() {
        let query = SearchQuery {
            sorts: vec![
                SortOption::desc("age"),
                SortOption::asc("password"),
                SortOption {
                    field: "name".to_string(),
                    direction: "up".to_string(),
                },
                SortOption {
                    field: "name".to_string(),
                    direction: "asc".to_string(),
                },
            ],
            ..SearchQuery::default()
        };
        let compiled = compile_query(&query, &options());
        assert_eq!(
            compiled.order_by,
            vec![
                ("age".to_string(), SortDirection::Desc),
                ("name".to_string(), SortDirection::Asc),
            ]
        );
        let sql = sql(&compiled);
        assert!(sql.contains(r#"ORDER BY "age" DESC, "name" ASC"#), "{sql}");
    }

    #[test]
    fn test_qualified_sort_column() {
        let query = SearchQuery {
            sorts: vec![SortOption::desc("people.age")],
            ..SearchQuery::default()
        };
        let sql = sql(&compile_query(&query, &options()));
        assert!(sql.contains(r#"ORDER BY "people"."age" DESC"#), "{sql}");
    }

    #[test]
    fn test_limit_is_clamped() {
        let query = SearchQuery {
            pagination: Pagination::new(1000, 0),
            ..SearchQuery::default()
        };
        assert_eq!(compile_query(&query, &options()).limit, Some(50));

        let query = SearchQuery {
            pagination: Pagination::new(10, 5),
            ..SearchQuery::default()
        };
        let compiled = compile_query(&query, &options());
        assert_eq!((compiled.limit, compiled.offset), (Some(10), Some(5)));
        let sql = sql(&compiled);
        assert!(sql.contains("LIMIT ? OFFSET ?"), "{sql}");
    }

    #[test]
    fn test_compile_request() {
        let request = SearchRequest {
            filters: Some(FilterGroup {
                and: vec![Filter::new("age", ">", 20).into()],
                or: vec![
                    Filter::new("name", "=", "Alice").into(),
                    Filter::new("name", "=", "Bob").into(),
                ],
            }),
            sort: vec![SortOption::asc("name")],
            pagination: Pagination::new(0, 0),
        };
        let compiled = compile_request(&request, &options());
        assert!(compiled.condition.is_some());
        assert_eq!(compiled.limit, None, "limit 0 means no limit");

        let sql = sql(&compiled);
        assert!(
            sql.contains(r#"WHERE "age" > ? AND ("name" = ? OR "name" = ?) ORDER BY "name" ASC"#),
            "{sql}"
        );
    }

    #[test]
    fn test_request_without_filters() {
        let request = SearchRequest {
            filters: Some(FilterGroup::default()),
            ..SearchRequest::default()
        };
        assert!(compile_request(&request, &options()).condition.is_none());
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let query = SearchQuery {
            filters: vec![
                Filter::new("name", "in", FilterValue::from(vec!["Alice", "Bob"])),
                Filter::new("age", "between", FilterValue::pair(20, 28)),
            ],
            sorts: vec![SortOption::desc("age")],
            pagination: Pagination::new(5, 0),
        };
        let options = options();
        let first = compile_query(&query, &options).apply(person::Entity::find());
        let second = compile_query(&query, &options).apply(person::Entity::find());
        assert_eq!(first.build(DbBackend::Sqlite), second.build(DbBackend::Sqlite));
    }

    #[test]
    fn test_apply_helpers() {
        let query = SearchQuery {
            filters: vec![Filter::new("age", "<", 40)],
            ..SearchQuery::default()
        };
        let sql = apply_query(person::Entity::find(), &query, &options())
            .build(DbBackend::Sqlite)
            .sql;
        assert!(sql.contains(r#"WHERE "age" < ?"#), "{sql}");

        let request = SearchRequest {
            filters: Some(FilterGroup::all([Filter::new("name", "=", "Bob")])),
            ..SearchRequest::default()
        };
        let sql = apply_request(person::Entity::find(), &request, &options())
            .build(DbBackend::Sqlite)
            .sql;
        assert!(sql.contains(r#"WHERE "name" = ?"#), "{sql}");
    }
}
