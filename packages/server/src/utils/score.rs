use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entity::{entry, vote};
use crate::error::AppError;
use crate::models::vote::{Polarity, Score};

/// Compute an entry's vote aggregate by counting live vote rows.
///
/// There is no persisted counter to drift out of sync; every read pays two
/// filtered COUNTs instead.
pub async fn score_of<C: ConnectionTrait>(db: &C, entry_id: i32) -> Result<Score, AppError> {
    let upvotes = count_votes(db, entry_id, Polarity::Up).await?;
    let downvotes = count_votes(db, entry_id, Polarity::Down).await?;
    Ok(Score { upvotes, downvotes })
}

async fn count_votes<C: ConnectionTrait>(
    db: &C,
    entry_id: i32,
    polarity: Polarity,
) -> Result<u64, AppError> {
    Ok(vote::Entity::find()
        .filter(vote::Column::EntryId.eq(entry_id))
        .filter(vote::Column::Polarity.eq(polarity.as_str()))
        .count(db)
        .await?)
}

/// Count the live comments directly under a root entry.
pub async fn comment_count_of<C: ConnectionTrait>(db: &C, root_id: i32) -> Result<u64, AppError> {
    Ok(entry::Entity::find()
        .filter(entry::Column::ParentId.eq(root_id))
        .count(db)
        .await?)
}
