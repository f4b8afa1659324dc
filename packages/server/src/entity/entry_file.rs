use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Join record attaching an uploaded file to an entry. Attachment is
/// zero-or-one per entry by convention; readers surface the oldest row.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entry_file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub entry_id: i32,
    #[sea_orm(primary_key)]
    pub file_id: i32,
    #[sea_orm(belongs_to, from = "entry_id", to = "id")]
    pub entry: Option<super::entry::Entity>,
    #[sea_orm(belongs_to, from = "file_id", to = "id")]
    pub file: Option<super::stored_file::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
