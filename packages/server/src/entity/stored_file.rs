use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stored_file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Store key (`{category}/{uuid}-{filename}`).
    #[sea_orm(unique)]
    pub key: String,

    /// Retrievable URL handed to clients.
    pub url: String,

    /// Category tag (e.g. "document").
    pub category: String,

    /// Original upload filename.
    pub filename: String,

    /// MIME content type.
    pub content_type: Option<String>,

    pub size: i64,

    #[sea_orm(has_many)]
    pub entries: HasMany<super::entry_file::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
