#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{NaiveDate, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;
use searchcrate::{FieldType, SearchOptions, SearchState, search_router};
use tower::ServiceExt;

pub mod person_entity;

/// Route library logs (dropped terms, API errors) to the test output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// A database holding Alice (30, born 1994-03-15) and Bob (25, born
/// 1999-03-15).
pub async fn setup_people_db() -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;
    insert_person(&db, "Alice", 30, "alice@test.com", true, 4.5, 2024).await?;
    insert_person(&db, "Bob", 25, "bob@gmail.com", false, 3.0, 2025).await?;
    Ok(db)
}

/// Alice and Bob plus three more, for sorting and paging.
pub async fn setup_crowded_db() -> Result<DatabaseConnection, DbErr> {
    let db = setup_people_db().await?;
    insert_person(&db, "Carol", 41, "carol@gmail.com", true, 5.0, 2023).await?;
    insert_person(&db, "Dave", 19, "dave@test.com", true, 2.5, 2025).await?;
    insert_person(&db, "Erin_100%", 35, "erin@test.com", false, 4.0, 2024).await?;
    Ok(db)
}

pub async fn insert_person(
    db: &DatabaseConnection,
    name: &str,
    age: i32,
    email: &str,
    active: bool,
    score: f64,
    joined_year: i32,
) -> Result<person_entity::Model, DbErr> {
    person_entity::ActiveModel {
        name: Set(name.to_string()),
        age: Set(age),
        email: Set(email.to_string()),
        active: Set(active),
        score: Set(score),
        created_at: Set(Utc.with_ymd_and_hms(joined_year, 6, 1, 12, 0, 0).unwrap()),
        born: Set(NaiveDate::from_ymd_opt(2024 - age, 3, 15).unwrap()),
        last_seen: Set(
            NaiveDate::from_ymd_opt(joined_year, 6, 1)
                .and_then(|day| day.and_hms_opt(12, 0, 0))
                .unwrap(),
        ),
        metadata: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub fn people_options() -> SearchOptions {
    SearchOptions::builder([
        "name",
        "age",
        "email",
        "active",
        "score",
        "created_at",
        "born",
        "last_seen",
    ])
        .infer_from_entity::<person_entity::Entity>()
        .max_limit(50)
        .build()
        .unwrap()
}

pub fn setup_search_app(db: DatabaseConnection, options: SearchOptions) -> Router {
    search_router::<person_entity::Entity>(SearchState::new(db, options))
}

/// Options with explicit types only, no entity inference.
pub fn typed_options(strict: bool) -> SearchOptions {
    SearchOptions::builder(["name", "age", "email"])
        .field_type("age", FieldType::Int)
        .strict_json(strict)
        .max_limit(50)
        .build()
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: &serde_json::Value) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Names of the people in a JSON array response, in response order.
pub fn names(body: &serde_json::Value) -> Vec<String> {
    body.as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Same as [`names`], sorted, for order-insensitive assertions.
pub fn sorted_names(body: &serde_json::Value) -> Vec<String> {
    let mut names = names(body);
    names.sort();
    names
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreatePeopleTable)]
    }
}

pub struct CreatePeopleTable;

impl MigrationName for CreatePeopleTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_people_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreatePeopleTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(People::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(People::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(People::Name).string().not_null())
            .col(ColumnDef::new(People::Age).integer().not_null())
            .col(ColumnDef::new(People::Email).string().not_null())
            .col(
                ColumnDef::new(People::Active)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(ColumnDef::new(People::Score).double().not_null())
            .col(
                ColumnDef::new(People::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(ColumnDef::new(People::Born).date().not_null())
            .col(ColumnDef::new(People::LastSeen).date_time().not_null())
            .col(ColumnDef::new(People::Metadata).json().null())
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(People::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum People {
    Table,
    Id,
    Name,
    Age,
    Email,
    Active,
    Score,
    CreatedAt,
    Born,
    LastSeen,
    Metadata,
}
