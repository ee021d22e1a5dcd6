use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::weights::{
    CLEAN_SAFETY_BONUS, CONSIDER_FLOOR, HIGHLY_RECOMMENDED_FLOOR, ON_TIME_WEIGHT, RATING_WEIGHT,
    RECOMMENDED_FLOOR, SAFETY_INCIDENT_PENALTY, SCORE_TIE_EPSILON, SKILL_WEIGHT, TRACK_RECORD_CAP,
    TRACK_RECORD_SCALE, TRACK_RECORD_WEIGHT,
};
use crate::CrewProfile;

/// Per-factor contributions, kept separate so a ranking can be explained to
/// a dispatcher item by item.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub rating: f64,
    pub on_time: f64,
    pub track_record: f64,
    pub safety: f64,
    pub skills: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.rating + self.on_time + self.track_record + self.safety + self.skills
    }
}

/// Additive weighted score. Pure and total: every input combination
/// produces a finite score, and identical inputs always reproduce the same
/// result bit for bit.
pub fn score_crew(crew: &CrewProfile) -> ScoreBreakdown {
    let performance = &crew.performance;

    let rating = performance.average_rating * RATING_WEIGHT;
    let on_time = performance.on_time_rate * ON_TIME_WEIGHT;
    let track_record = (f64::from(performance.completed_projects) / TRACK_RECORD_SCALE)
        .min(TRACK_RECORD_CAP)
        * TRACK_RECORD_WEIGHT;
    let safety = if performance.safety_incidents == 0 {
        CLEAN_SAFETY_BONUS
    } else {
        -(f64::from(performance.safety_incidents) * SAFETY_INCIDENT_PENALTY)
    };
    let skills = f64::from(crew.skill_count) * SKILL_WEIGHT;

    ScoreBreakdown {
        rating,
        on_time,
        track_record,
        safety,
        skills,
    }
}

/// Ordering for ranked output: descending score, then tie-break by fewer
/// safety incidents and finally lower crew id so repeated runs are stable.
pub fn rank_cmp(score_a: f64, a: &CrewProfile, score_b: f64, b: &CrewProfile) -> Ordering {
    if (score_a - score_b).abs() >= SCORE_TIE_EPSILON {
        return score_b.partial_cmp(&score_a).unwrap_or(Ordering::Equal);
    }

    a.performance
        .safety_incidents
        .cmp(&b.performance.safety_incidents)
        .then_with(|| a.id.cmp(&b.id))
}

/// Human-readable recommendation bucket. Display only; never fed back into
/// the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    HighlyRecommended,
    Recommended,
    Consider,
    NotRecommended,
}

impl Tier {
    pub fn from_score(score: f64) -> Self {
        if score > HIGHLY_RECOMMENDED_FLOOR {
            Tier::HighlyRecommended
        } else if score > RECOMMENDED_FLOOR {
            Tier::Recommended
        } else if score > CONSIDER_FLOOR {
            Tier::Consider
        } else {
            Tier::NotRecommended
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::HighlyRecommended => "highly_recommended",
            Tier::Recommended => "recommended",
            Tier::Consider => "consider",
            Tier::NotRecommended => "not_recommended",
        }
    }
}
