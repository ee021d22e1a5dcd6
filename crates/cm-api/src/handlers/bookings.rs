use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use cm_common::db::{persist_booking, persist_release};
use cm_common::{CrewId, TimeWindow, ValidationError};

use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub project_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Book a crew for a window. This is the authoritative availability check;
/// ranking results are advisory and may be stale by the time a caller
/// commits.
pub async fn create_booking(
    State(state): State<SharedState>,
    Path(crew_id): Path<CrewId>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if request.project_id.trim().is_empty() {
        return Err(ValidationError::EmptyProjectId.into());
    }
    let window = TimeWindow::new(request.start, request.end)?;

    persist_booking(&state.pool, crew_id, &window, &request.project_id).await?;

    info!(crew_id, project_id = %request.project_id, "crew booked");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "crewId": crew_id,
            "projectId": request.project_id,
            "start": window.start,
            "end": window.end,
        })),
    ))
}

/// Release a booking. Idempotent: releasing a booking that never existed
/// still returns 204, matching the no-op semantics of the core.
pub async fn release_booking(
    State(state): State<SharedState>,
    Path((crew_id, project_id)): Path<(CrewId, String)>,
) -> Result<StatusCode, ApiError> {
    persist_release(&state.pool, crew_id, &project_id).await?;

    info!(crew_id, %project_id, "booking released");
    Ok(StatusCode::NO_CONTENT)
}
