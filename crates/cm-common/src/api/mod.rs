pub mod recommendation;

pub use recommendation::{CrewRecommendation, ScoreBreakdownDto};
