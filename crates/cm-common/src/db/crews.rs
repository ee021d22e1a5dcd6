use std::collections::HashMap;

use chrono::{DateTime, Utc};
use deadpool_postgres::PoolError;
use tokio_postgres::{Error as PgError, Row};
use tracing::instrument;

use crate::availability::BookedInterval;
use crate::db::PgPool;
use crate::{CrewId, CrewProfile, CrewStatus, GeoPoint, PerformanceRecord, TradeType};

#[derive(Debug, thiserror::Error)]
pub enum CrewFetchError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("failed to map crew row: {0}")]
    Mapping(String),
}

const CREW_COLUMNS: &str = "id, name, specializations, base_lat, base_lng, travel_radius_km, \
     skill_count, completed_projects, average_rating, on_time_rate, safety_incidents, \
     status, is_active";

fn map_crew_row(row: &Row) -> Result<CrewProfile, CrewFetchError> {
    let tags: Vec<String> = row.get("specializations");
    let specializations = tags
        .iter()
        .map(|tag| {
            tag.parse::<TradeType>()
                .map_err(|err| CrewFetchError::Mapping(err.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let status: String = row.get("status");
    let status = status
        .parse::<CrewStatus>()
        .map_err(CrewFetchError::Mapping)?;

    let base_location = match (
        row.get::<_, Option<f64>>("base_lat"),
        row.get::<_, Option<f64>>("base_lng"),
    ) {
        (Some(lat), Some(lng)) => {
            Some(GeoPoint::new(lat, lng).map_err(|err| CrewFetchError::Mapping(err.to_string()))?)
        }
        _ => None,
    };

    let to_count = |column: &str| -> Result<u32, CrewFetchError> {
        let value: i32 = row.get(column);
        u32::try_from(value)
            .map_err(|_| CrewFetchError::Mapping(format!("negative {column}: {value}")))
    };

    Ok(CrewProfile {
        id: row.get("id"),
        name: row.get("name"),
        specializations,
        base_location,
        travel_radius_km: row.get("travel_radius_km"),
        skill_count: to_count("skill_count")?,
        performance: PerformanceRecord {
            completed_projects: to_count("completed_projects")?,
            average_rating: row.get("average_rating"),
            on_time_rate: row.get("on_time_rate"),
            safety_incidents: to_count("safety_incidents")?,
        },
        status,
        is_active: row.get("is_active"),
        booked_intervals: Vec::new(),
    })
}

/// Attach booked intervals to already-mapped crews with a single query.
async fn attach_bookings(
    client: &deadpool_postgres::Client,
    crews: &mut [CrewProfile],
) -> Result<(), CrewFetchError> {
    if crews.is_empty() {
        return Ok(());
    }

    let ids: Vec<CrewId> = crews.iter().map(|crew| crew.id).collect();
    let rows = client
        .query(
            "SELECT crew_id, project_id, start_at, end_at \
             FROM cm.crew_bookings \
             WHERE crew_id = ANY($1) \
             ORDER BY crew_id, start_at",
            &[&ids],
        )
        .await?;

    let mut by_crew: HashMap<CrewId, Vec<BookedInterval>> = HashMap::new();
    for row in rows {
        let crew_id: CrewId = row.get("crew_id");
        by_crew.entry(crew_id).or_default().push(BookedInterval {
            start: row.get::<_, DateTime<Utc>>("start_at"),
            end: row.get::<_, DateTime<Utc>>("end_at"),
            project_id: row.get("project_id"),
        });
    }

    for crew in crews.iter_mut() {
        if let Some(intervals) = by_crew.remove(&crew.id) {
            crew.booked_intervals = intervals;
        }
    }

    Ok(())
}

/// Active crews carrying the given specialization, bookings included.
/// This is the pool the Ranker operates on.
#[instrument(skip(pool))]
pub async fn fetch_active_crews_by_trade(
    pool: &PgPool,
    trade: TradeType,
) -> Result<Vec<CrewProfile>, CrewFetchError> {
    let client = pool.get().await?;

    let query = format!(
        "SELECT {CREW_COLUMNS} FROM cm.crews \
         WHERE is_active AND $1 = ANY(specializations) \
         ORDER BY id"
    );
    let rows = client.query(&query, &[&trade.as_str()]).await?;

    let mut crews = rows
        .iter()
        .map(map_crew_row)
        .collect::<Result<Vec<_>, _>>()?;

    attach_bookings(&client, &mut crews).await?;
    Ok(crews)
}

/// Paged roster listing with optional status/trade filters.
#[instrument(skip(pool))]
pub async fn list_crews(
    pool: &PgPool,
    status: Option<CrewStatus>,
    trade: Option<TradeType>,
    limit: i64,
    offset: i64,
) -> Result<Vec<CrewProfile>, CrewFetchError> {
    let client = pool.get().await?;

    let mut conditions = vec!["is_active".to_string()];
    let mut params: Vec<Box<dyn tokio_postgres::types::ToSql + Sync + Send>> = Vec::new();

    if let Some(status) = status {
        params.push(Box::new(status.as_str()));
        conditions.push(format!("status = ${}", params.len()));
    }
    if let Some(trade) = trade {
        params.push(Box::new(trade.as_str()));
        conditions.push(format!("${} = ANY(specializations)", params.len()));
    }

    params.push(Box::new(limit));
    let limit_param = params.len();
    params.push(Box::new(offset));
    let offset_param = params.len();

    let query = format!(
        "SELECT {CREW_COLUMNS} FROM cm.crews \
         WHERE {} ORDER BY id LIMIT ${limit_param} OFFSET ${offset_param}",
        conditions.join(" AND ")
    );

    let param_refs: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> = params
        .iter()
        .map(|param| param.as_ref() as &(dyn tokio_postgres::types::ToSql + Sync))
        .collect();

    let rows = client.query(&query, &param_refs).await?;
    let mut crews = rows
        .iter()
        .map(map_crew_row)
        .collect::<Result<Vec<_>, _>>()?;

    attach_bookings(&client, &mut crews).await?;
    Ok(crews)
}
