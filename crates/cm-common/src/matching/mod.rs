pub mod geo;
pub mod ranker;
pub mod scoring;
pub mod weights;

pub use geo::haversine_km;
pub use ranker::{AdvisorConfig, CrewAdvisor, ScoredCandidate};
pub use scoring::{rank_cmp, score_crew, ScoreBreakdown, Tier};
