use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::db::PgPool;
use crate::schema::{CREWS_DDL, CREW_BOOKINGS_DDL};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] PgError),
}

struct Migration {
    id: i32,
    description: &'static str,
    statements: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[Migration {
    id: 1,
    description: "crews roster + bookings with overlap exclusion",
    statements: &[
        "CREATE EXTENSION IF NOT EXISTS btree_gist",
        CREWS_DDL,
        CREW_BOOKINGS_DDL,
    ],
}];

/// Apply pending migrations, recording applied ids in
/// `cm.schema_migrations`. Safe to run on every startup.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let mut client = pool.get().await?;
    client
        .batch_execute(
            "CREATE SCHEMA IF NOT EXISTS cm;
             CREATE TABLE IF NOT EXISTS cm.schema_migrations (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             );",
        )
        .await?;

    for migration in MIGRATIONS {
        let already_applied: bool = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM cm.schema_migrations WHERE id = $1)",
                &[&migration.id],
            )
            .await?
            .get(0);

        if already_applied {
            continue;
        }

        let tx = client.transaction().await?;
        for statement in migration.statements {
            tx.batch_execute(statement).await?;
        }
        tx.execute(
            "INSERT INTO cm.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;

        info!(
            id = migration.id,
            description = migration.description,
            "applied migration"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_ids_are_unique_and_ascending() {
        let mut previous = 0;
        for migration in MIGRATIONS {
            assert!(migration.id > previous, "ids must ascend");
            previous = migration.id;
        }
    }

    #[test]
    fn first_migration_installs_the_overlap_guard() {
        let statements = MIGRATIONS[0].statements;
        assert!(statements
            .iter()
            .any(|sql| sql.contains("btree_gist")));
        assert!(statements
            .iter()
            .any(|sql| sql.contains("excl_crew_booking_overlap")));
    }
}
