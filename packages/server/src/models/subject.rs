use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::validate_name;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubjectRequest {
    #[schema(example = "Analysis II")]
    pub name: String,
    pub career_id: i32,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateSubjectRequest {
    pub name: Option<String>,
    pub career_id: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubjectResponse {
    pub id: i32,
    pub name: String,
    pub career_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::subject::Model> for SubjectResponse {
    fn from(m: crate::entity::subject::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            career_id: m.career_id,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_subject(req: &CreateSubjectRequest) -> Result<(), AppError> {
    validate_name(&req.name)
}

pub fn validate_update_subject(req: &UpdateSubjectRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name)?;
    }
    Ok(())
}
