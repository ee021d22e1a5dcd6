use super::geo::haversine_km;
use super::scoring::{rank_cmp, score_crew, ScoreBreakdown, Tier};
use crate::availability::AvailabilityIndex;
use crate::{CrewProfile, CrewStatus, ProjectRequirement};

/// Fallback proximity bound when a crew carries no travel radius of its own.
/// The per-crew field is authoritative; this only fills the gap.
pub const DEFAULT_TRAVEL_RADIUS_KM: f64 = 80.0;

/// Shortlist length when the caller does not ask for one.
pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub default_travel_radius_km: f64,
    pub default_top_n: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            default_travel_radius_km: DEFAULT_TRAVEL_RADIUS_KM,
            default_top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub crew: CrewProfile,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub tier: Tier,
    pub distance_km: Option<f64>,
}

/// End-to-end query processing: hard filters, conflict re-check, scoring,
/// deterministic sort, shortlist truncation. Pure over snapshot data; safe
/// to run from any task without coordination.
#[derive(Debug, Clone, Default)]
pub struct CrewAdvisor {
    config: AdvisorConfig,
}

impl CrewAdvisor {
    pub fn new(config: AdvisorConfig) -> Self {
        Self { config }
    }

    /// Rank `pool` against `requirement` and return the top candidates.
    ///
    /// An empty result is a valid outcome, not an error: callers widen the
    /// search or relax constraints instead of treating it as a failure.
    pub fn rank_crews(
        &self,
        requirement: &ProjectRequirement,
        pool: &[CrewProfile],
        availability: &AvailabilityIndex,
        top_n: Option<usize>,
    ) -> Vec<ScoredCandidate> {
        let mut candidates: Vec<ScoredCandidate> = pool
            .iter()
            .filter(|crew| self.passes_hard_filters(requirement, crew))
            .filter(|crew| {
                // Status already gates most conflicts; an explicit window
                // still needs a re-check because an available crew may hold
                // a future booking overlapping it.
                match requirement.window {
                    Some(window) => !availability.has_conflict(crew.id, window.start, window.end),
                    None => true,
                }
            })
            .map(|crew| self.score_candidate(requirement, crew))
            .collect();

        candidates.sort_by(|a, b| rank_cmp(a.score, &a.crew, b.score, &b.crew));
        candidates.truncate(top_n.unwrap_or(self.config.default_top_n));
        candidates
    }

    fn passes_hard_filters(&self, requirement: &ProjectRequirement, crew: &CrewProfile) -> bool {
        if !crew.is_active
            || crew.status != CrewStatus::Available
            || !crew.specializations.contains(&requirement.trade_type)
        {
            return false;
        }

        match self.distance_to(requirement, crew) {
            Some(distance) => distance <= self.effective_radius_km(crew),
            // No coordinates on either side: proximity cannot disqualify.
            None => true,
        }
    }

    fn score_candidate(
        &self,
        requirement: &ProjectRequirement,
        crew: &CrewProfile,
    ) -> ScoredCandidate {
        let breakdown = score_crew(crew);
        let score = breakdown.total();

        ScoredCandidate {
            crew: crew.clone(),
            score,
            breakdown,
            tier: Tier::from_score(score),
            distance_km: self.distance_to(requirement, crew),
        }
    }

    fn distance_to(&self, requirement: &ProjectRequirement, crew: &CrewProfile) -> Option<f64> {
        match (requirement.location, crew.base_location) {
            (Some(site), Some(base)) => Some(haversine_km(site, base)),
            _ => None,
        }
    }

    fn effective_radius_km(&self, crew: &CrewProfile) -> f64 {
        crew.travel_radius_km
            .filter(|radius| *radius > 0.0)
            .unwrap_or(self.config.default_travel_radius_km)
    }
}
