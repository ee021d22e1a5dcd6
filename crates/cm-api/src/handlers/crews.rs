use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use cm_common::api::CrewRecommendation;
use cm_common::availability::AvailabilityIndex;
use cm_common::db::{fetch_active_crews_by_trade, list_crews};
use cm_common::{
    CrewStatus, GeoPoint, ProjectRequirement, SizeHint, TimeWindow, TradeType, Urgency,
    ValidationError,
};

use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationQuery {
    pub trade_type: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub project_size: SizeHint,
    pub limit: Option<usize>,
}

fn requirement_from_query(query: &RecommendationQuery) -> Result<ProjectRequirement, ApiError> {
    let trade_type: TradeType = query.trade_type.parse().map_err(ApiError::from)?;

    let location = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)?),
        (None, None) => None,
        _ => return Err(ValidationError::PartialCoordinate.into()),
    };

    let window = match (query.start, query.end) {
        (Some(start), Some(end)) => Some(TimeWindow::new(start, end)?),
        (None, None) => None,
        _ => {
            return Err(ApiError::BadRequest(
                "start and end must be supplied together".into(),
            ))
        }
    };

    Ok(ProjectRequirement {
        trade_type,
        location,
        window,
        urgency: query.urgency,
        size_hint: query.project_size,
    })
}

/// Ranked shortlist for a project requirement. An empty array is a valid
/// answer, not an error; the caller widens the search instead.
pub async fn recommend_crews(
    State(state): State<SharedState>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<Vec<CrewRecommendation>>, ApiError> {
    let requirement = requirement_from_query(&query)?;
    let top_n = query.limit.map(|limit| limit.clamp(1, 50));

    let pool = fetch_active_crews_by_trade(&state.pool, requirement.trade_type).await?;
    let availability = AvailabilityIndex::from_profiles(&pool);

    let ranked = state
        .advisor
        .rank_crews(&requirement, &pool, &availability, top_n);

    Ok(Json(ranked.iter().map(CrewRecommendation::from).collect()))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<String>,
    pub trade_type: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

const fn default_limit() -> u32 {
    50
}

pub async fn list_roster(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CrewRecommendation>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|raw| raw.parse::<CrewStatus>().map_err(ApiError::BadRequest))
        .transpose()?;
    let trade = query
        .trade_type
        .as_deref()
        .map(|raw| raw.parse::<TradeType>().map_err(ApiError::from))
        .transpose()?;

    let limit = i64::from(query.limit.clamp(1, 200));
    let offset = i64::from(query.offset.min(10_000));

    let crews = list_crews(&state.pool, status, trade, limit, offset).await?;

    // Roster rows reuse the recommendation shape so the frontend renders one
    // table; scores are still computed, tiers included.
    let ranked: Vec<CrewRecommendation> = crews
        .iter()
        .map(|crew| {
            let breakdown = cm_common::matching::score_crew(crew);
            let score = breakdown.total();
            CrewRecommendation {
                crew_id: crew.id,
                crew_name: crew.name.clone(),
                specializations: crew.specializations.clone(),
                status: crew.status,
                optimization_score: score,
                recommendation: cm_common::matching::Tier::from_score(score),
                score_breakdown: (&breakdown).into(),
                distance_km: None,
            }
        })
        .collect();

    Ok(Json(ranked))
}
