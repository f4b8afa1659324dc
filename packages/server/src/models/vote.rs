use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Direction of a vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Up,
    Down,
}

impl Polarity {
    /// Column value stored for this polarity.
    pub fn as_str(self) -> &'static str {
        match self {
            Polarity::Up => "up",
            Polarity::Down => "down",
        }
    }

    /// Parse a stored column value. Anything else is a data-integrity fault.
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "up" => Ok(Polarity::Up),
            "down" => Ok(Polarity::Down),
            other => Err(AppError::DataIntegrity(format!(
                "unknown vote polarity '{other}'"
            ))),
        }
    }
}

/// Request body for casting a vote.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CastVoteRequest {
    pub polarity: Polarity,
}

/// What a cast-vote call did to the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VoteOutcome {
    /// First vote by this user on this entry.
    Created,
    /// Same polarity repeated: the vote was toggled off.
    Removed,
    /// Opposite polarity: the existing vote was flipped in place.
    Updated,
}

/// Read-time vote aggregate for an entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Score {
    #[schema(example = 12)]
    pub upvotes: u64,
    #[schema(example = 3)]
    pub downvotes: u64,
}

/// Response for a cast-vote call.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CastVoteResponse {
    pub outcome: VoteOutcome,
    /// Aggregate after the operation.
    pub score: Score,
}

/// Response for the score read endpoint.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ScoreResponse {
    pub entry_id: i32,
    pub upvotes: u64,
    pub downvotes: u64,
    /// Number of direct comments (0 for comments themselves).
    pub comment_count: u64,
}
