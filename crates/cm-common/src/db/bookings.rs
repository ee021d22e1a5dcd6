use deadpool_postgres::PoolError;
use tokio_postgres::error::SqlState;
use tokio_postgres::Error as PgError;
use tracing::instrument;

use crate::db::PgPool;
use crate::{CrewId, TimeWindow};

#[derive(Debug, thiserror::Error)]
pub enum BookingStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(PgError),
    #[error("crew not found: {0}")]
    CrewNotFound(CrewId),
    #[error("booking overlaps an existing interval for crew {0}")]
    Overlap(CrewId),
}

fn map_pg(crew_id: CrewId, err: PgError) -> BookingStorageError {
    // The exclusion constraint is the safety net for writers that race past
    // the in-transaction check.
    match err.code() {
        Some(&SqlState::EXCLUSION_VIOLATION) | Some(&SqlState::UNIQUE_VIOLATION) => {
            BookingStorageError::Overlap(crew_id)
        }
        _ => BookingStorageError::Postgres(err),
    }
}

/// Durably book a crew for a window. The crew row is locked for the span of
/// the transaction, so the overlap check and the insert form one atomic
/// unit; two concurrent bookings for the same crew serialize on the row
/// lock and the loser observes the winner's interval.
#[instrument(skip(pool))]
pub async fn persist_booking(
    pool: &PgPool,
    crew_id: CrewId,
    window: &TimeWindow,
    project_id: &str,
) -> Result<(), BookingStorageError> {
    let mut client = pool.get().await?;
    let tx = client
        .transaction()
        .await
        .map_err(|err| map_pg(crew_id, err))?;

    let crew_row = tx
        .query_opt("SELECT id FROM cm.crews WHERE id = $1 FOR UPDATE", &[&crew_id])
        .await
        .map_err(|err| map_pg(crew_id, err))?;
    if crew_row.is_none() {
        return Err(BookingStorageError::CrewNotFound(crew_id));
    }

    let overlapping: bool = tx
        .query_one(
            "SELECT EXISTS (
                SELECT 1 FROM cm.crew_bookings
                WHERE crew_id = $1 AND start_at < $3 AND $2 < end_at
            )",
            &[&crew_id, &window.start, &window.end],
        )
        .await
        .map_err(|err| map_pg(crew_id, err))?
        .get(0);
    if overlapping {
        return Err(BookingStorageError::Overlap(crew_id));
    }

    tx.execute(
        "INSERT INTO cm.crew_bookings (crew_id, project_id, start_at, end_at) \
         VALUES ($1, $2, $3, $4)",
        &[&crew_id, &project_id, &window.start, &window.end],
    )
    .await
    .map_err(|err| map_pg(crew_id, err))?;

    tx.execute(
        "UPDATE cm.crews SET status = 'assigned', updated_at = NOW() WHERE id = $1",
        &[&crew_id],
    )
    .await
    .map_err(|err| map_pg(crew_id, err))?;

    tx.commit().await.map_err(|err| map_pg(crew_id, err))?;
    Ok(())
}

/// Remove the booking matching `project_id`. Idempotent: a missing booking
/// is a no-op, not an error. The crew flips back to available once its last
/// interval is gone.
#[instrument(skip(pool))]
pub async fn persist_release(
    pool: &PgPool,
    crew_id: CrewId,
    project_id: &str,
) -> Result<(), BookingStorageError> {
    let mut client = pool.get().await?;
    let tx = client
        .transaction()
        .await
        .map_err(|err| map_pg(crew_id, err))?;

    let crew_row = tx
        .query_opt("SELECT id FROM cm.crews WHERE id = $1 FOR UPDATE", &[&crew_id])
        .await
        .map_err(|err| map_pg(crew_id, err))?;
    if crew_row.is_none() {
        return Err(BookingStorageError::CrewNotFound(crew_id));
    }

    tx.execute(
        "DELETE FROM cm.crew_bookings WHERE crew_id = $1 AND project_id = $2",
        &[&crew_id, &project_id],
    )
    .await
    .map_err(|err| map_pg(crew_id, err))?;

    let remaining: bool = tx
        .query_one(
            "SELECT EXISTS (SELECT 1 FROM cm.crew_bookings WHERE crew_id = $1)",
            &[&crew_id],
        )
        .await
        .map_err(|err| map_pg(crew_id, err))?
        .get(0);

    if !remaining {
        tx.execute(
            "UPDATE cm.crews SET status = 'available', updated_at = NOW() \
             WHERE id = $1 AND status = 'assigned'",
            &[&crew_id],
        )
        .await
        .map_err(|err| map_pg(crew_id, err))?;
    }

    tx.commit().await.map_err(|err| map_pg(crew_id, err))?;
    Ok(())
}
