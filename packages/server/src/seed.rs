use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{entry, role, role_permission, vote};

/// Default roles seeded on startup.
const DEFAULT_ROLES: &[&str] = &["student", "moderator"];

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    ("moderator", "entry:moderate"),
    ("moderator", "subject:manage"),
    ("moderator", "career:manage"),
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Seed roles
    let mut roles_inserted = 0u32;
    for &name in DEFAULT_ROLES {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(role::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => roles_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    // Seed role-permission mappings
    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => perms_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Composite index for vote counting:
    // SELECT COUNT(*) FROM vote WHERE entry_id = ? AND polarity = ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_vote_entry_polarity")
        .table(vote::Entity)
        .col(vote::Column::EntryId)
        .col(vote::Column::Polarity)
        .to_string(PostgresQueryBuilder);

    let result = db.execute_unprepared(&stmt).await;

    match result {
        Ok(_) => {
            info!("Ensured index idx_vote_entry_polarity exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_vote_entry_polarity: {}", e);
        }
    }

    // Composite index for comment listing in creation order:
    // SELECT * FROM entry WHERE parent_id = ? ORDER BY created_at
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_entry_parent_created")
        .table(entry::Entity)
        .col(entry::Column::ParentId)
        .col(entry::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    let result = db.execute_unprepared(&stmt).await;
    match result {
        Ok(_) => {
            info!("Ensured index idx_entry_parent_created exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_entry_parent_created: {}", e);
        }
    }

    Ok(())
}
