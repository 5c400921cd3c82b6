use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "people")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub email: String,
    pub active: bool,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub born: NaiveDate,
    pub last_seen: NaiveDateTime,
    #[sea_orm(column_type = "Json", nullable)]
    pub metadata: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
