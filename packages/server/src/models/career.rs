use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::validate_name;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCareerRequest {
    #[schema(example = "Systems Engineering")]
    pub name: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CareerResponse {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::career::Model> for CareerResponse {
    fn from(m: crate::entity::career::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_career(req: &CreateCareerRequest) -> Result<(), AppError> {
    validate_name(&req.name)
}
