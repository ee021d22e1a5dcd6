//! Scoring weights and tier boundaries.
//!
//! These are fixed business constants, not configuration: a dispatcher must
//! be able to reconstruct any ranking by hand, so every factor carries a
//! named weight here instead of a tunable knob.

/// Average crew rating is 0-5, so this contributes 0-100.
pub const RATING_WEIGHT: f64 = 20.0;

/// On-time completion rate is 0-1, contributing 0-15.
pub const ON_TIME_WEIGHT: f64 = 15.0;

/// Completed-project count is scaled down and capped before weighting, so a
/// long history stops accumulating credit past 100 projects.
pub const TRACK_RECORD_SCALE: f64 = 10.0;
pub const TRACK_RECORD_CAP: f64 = 10.0;
pub const TRACK_RECORD_WEIGHT: f64 = 10.0;

/// Flat bonus for a clean safety record.
pub const CLEAN_SAFETY_BONUS: f64 = 25.0;

/// Deduction per recorded safety incident.
pub const SAFETY_INCIDENT_PENALTY: f64 = 5.0;

/// Contribution per distinct skill held across crew members.
pub const SKILL_WEIGHT: f64 = 2.0;

/// Scores within this distance are treated as tied and fall through to the
/// deterministic tie-break (fewer incidents, then lower crew id).
pub const SCORE_TIE_EPSILON: f64 = 1e-9;

/// Tier boundaries, exclusive at the floor: score > 80 is highly
/// recommended, 60 < score <= 80 recommended, 40 < score <= 60 consider,
/// anything else not recommended.
pub const HIGHLY_RECOMMENDED_FLOOR: f64 = 80.0;
pub const RECOMMENDED_FLOOR: f64 = 60.0;
pub const CONSIDER_FLOOR: f64 = 40.0;
