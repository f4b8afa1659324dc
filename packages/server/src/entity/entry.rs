use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `parent_id` value marking a root post.
pub const ROOT_PARENT: i32 = 0;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub author_id: i32,
    #[sea_orm(belongs_to, from = "author_id", to = "id")]
    pub author: Option<super::user::Entity>,

    pub subject_id: i32,
    #[sea_orm(belongs_to, from = "subject_id", to = "id")]
    pub subject: Option<super::subject::Entity>,

    /// 0 marks a root post; comments carry their root's id. Kept as a plain
    /// column (no FK) so the sentinel never has to reference a real row.
    #[sea_orm(default_value = 0)]
    pub parent_id: i32,

    /// Present on root posts, NULL on comments.
    pub title: Option<String>,
    pub body: String,

    #[sea_orm(has_many)]
    pub votes: HasMany<super::vote::Entity>,

    #[sea_orm(has_many)]
    pub files: HasMany<super::entry_file::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// An entry's kind is derived solely from its parent pointer.
    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT
    }
}

impl ActiveModelBehavior for ActiveModel {}
