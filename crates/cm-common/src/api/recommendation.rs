use serde::{Deserialize, Serialize};

use crate::matching::{ScoreBreakdown, ScoredCandidate, Tier};
use crate::{CrewId, CrewStatus, TradeType};

/// Ranked-crew response row. Field names are camelCase because the existing
/// frontend consumes `optimizationScore` / `recommendation` verbatim; keep
/// them stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewRecommendation {
    pub crew_id: CrewId,
    pub crew_name: String,
    pub specializations: Vec<TradeType>,
    pub status: CrewStatus,
    pub optimization_score: f64,
    pub recommendation: Tier,
    pub score_breakdown: ScoreBreakdownDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdownDto {
    pub rating: f64,
    pub on_time: f64,
    pub track_record: f64,
    pub safety: f64,
    pub skills: f64,
    pub total: f64,
}

impl From<&ScoreBreakdown> for ScoreBreakdownDto {
    fn from(value: &ScoreBreakdown) -> Self {
        Self {
            rating: value.rating,
            on_time: value.on_time,
            track_record: value.track_record,
            safety: value.safety,
            skills: value.skills,
            total: value.total(),
        }
    }
}

impl From<&ScoredCandidate> for CrewRecommendation {
    fn from(candidate: &ScoredCandidate) -> Self {
        Self {
            crew_id: candidate.crew.id,
            crew_name: candidate.crew.name.clone(),
            specializations: candidate.crew.specializations.clone(),
            status: candidate.crew.status,
            optimization_score: candidate.score,
            recommendation: candidate.tier,
            score_breakdown: ScoreBreakdownDto::from(&candidate.breakdown),
            distance_km: candidate.distance_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::score_crew;
    use crate::{CrewProfile, PerformanceRecord};

    fn candidate() -> ScoredCandidate {
        let crew = CrewProfile {
            id: 42,
            name: "CrewAlpha".into(),
            specializations: vec![TradeType::Electrical],
            skill_count: 8,
            performance: PerformanceRecord {
                completed_projects: 12,
                average_rating: 4.9,
                on_time_rate: 0.95,
                safety_incidents: 0,
            },
            is_active: true,
            ..CrewProfile::default()
        };
        let breakdown = score_crew(&crew);
        let score = breakdown.total();

        ScoredCandidate {
            tier: Tier::from_score(score),
            crew,
            score,
            breakdown,
            distance_km: None,
        }
    }

    #[test]
    fn serializes_compatibility_field_names() {
        let response = CrewRecommendation::from(&candidate());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["crewId"], 42);
        assert_eq!(json["optimizationScore"], 165.25);
        assert_eq!(json["recommendation"], "highly_recommended");
        assert_eq!(json["scoreBreakdown"]["onTime"], 14.25);
        assert!(json.get("distanceKm").is_none());
    }

    #[test]
    fn breakdown_total_matches_score() {
        let response = CrewRecommendation::from(&candidate());
        assert_eq!(response.score_breakdown.total, response.optimization_score);
    }
}
