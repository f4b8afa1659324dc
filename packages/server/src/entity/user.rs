use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    pub password: String,

    pub role: String,
    #[sea_orm(belongs_to, from = "role", to = "name")]
    pub role_ref: Option<super::role::Entity>,

    /// NULL for users who have not picked a career.
    pub career_id: Option<i32>,
    #[sea_orm(belongs_to, from = "career_id", to = "id")]
    pub career: Option<super::career::Entity>,

    #[sea_orm(has_many)]
    pub entries: HasMany<super::entry::Entity>,

    #[sea_orm(has_many)]
    pub votes: HasMany<super::vote::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
