use axum::{extract::State, Json};
use serde_json::json;
use tokio::time::{timeout, Duration};

use crate::error::ApiError;
use crate::SharedState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Process-level liveness; never touches the database.
pub async fn livez() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
    }))
}

/// Readiness: refuse while draining, then verify the crew schema is
/// reachable. Counting `cm.schema_migrations` doubles as a check that the
/// migration runner completed, not just that a socket opens.
pub async fn readyz(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.readiness.load(std::sync::atomic::Ordering::SeqCst) {
        return Err(ApiError::ServiceUnavailable("draining".into()));
    }

    let client = timeout(PROBE_TIMEOUT, state.pool.get())
        .await
        .map_err(|_| ApiError::ServiceUnavailable("pool_checkout_timed_out".into()))?
        .map_err(|err| {
            ApiError::ServiceUnavailable(format!("pool checkout failed: {err}"))
        })?;

    let row = timeout(
        PROBE_TIMEOUT,
        client.query_one("SELECT COUNT(*) FROM cm.schema_migrations", &[]),
    )
    .await
    .map_err(|_| ApiError::ServiceUnavailable("schema_probe_timed_out".into()))?
    .map_err(|err| ApiError::ServiceUnavailable(format!("crew schema not ready: {err}")))?;

    let migrations_applied: i64 = row.get(0);

    Ok(Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "database": "ok",
        "migrationsApplied": migrations_applied,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn livez_reports_the_service_name() {
        let Json(body) = livez().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "cm-api");
    }

    #[tokio::test]
    async fn readyz_rejects_while_draining() {
        let state = crate::test_state();
        state
            .readiness
            .store(false, std::sync::atomic::Ordering::SeqCst);

        let result = readyz(State(state)).await;

        match result {
            Err(ApiError::ServiceUnavailable(code)) => assert_eq!(code, "draining"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
