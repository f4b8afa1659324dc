use chrono::{DateTime, Utc};
use serde::Serialize;

/// Public profile for a user, as shown next to their posts.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserProfileResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "amalia_dev")]
    pub username: String,
    /// Career the user studies, if set.
    pub career_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::user::Model> for UserProfileResponse {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            career_id: user.career_id,
            created_at: user.created_at,
        }
    }
}
