use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    /// The composite primary key is the at-most-one-vote-per-(entry, user)
    /// invariant: a concurrent duplicate insert fails at the storage layer.
    #[sea_orm(primary_key)]
    pub entry_id: i32,
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "entry_id", to = "id")]
    pub entry: Option<super::entry::Entity>,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: Option<super::user::Entity>,

    /// "up" or "down"; parsed only through `models::vote::Polarity`.
    pub polarity: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
