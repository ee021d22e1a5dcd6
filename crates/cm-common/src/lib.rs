pub mod api;
pub mod availability;
pub mod db;
pub mod logging;
pub mod matching;
pub mod schema;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use availability::BookedInterval;

pub type CrewId = i64;

/// Malformed caller input, rejected before any matching or booking runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("unknown trade type: {0}")]
    UnknownTradeType(String),
    #[error("requested interval is empty or inverted: {start} >= {end}")]
    EmptyInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("latitude and longitude must be supplied together")]
    PartialCoordinate,
    #[error("latitude out of range: {0}")]
    LatitudeOutOfRange(f64),
    #[error("longitude out of range: {0}")]
    LongitudeOutOfRange(f64),
    #[error("project id must not be empty")]
    EmptyProjectId,
}

/// Trade categories a crew can be booked for. Acts as the hard filter ahead
/// of scoring, so the set is closed rather than free-form text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Electrical,
    Plumbing,
    Hvac,
    Roofing,
    Carpentry,
    Concrete,
    Masonry,
    General,
}

impl TradeType {
    pub const ALL: [TradeType; 8] = [
        TradeType::Electrical,
        TradeType::Plumbing,
        TradeType::Hvac,
        TradeType::Roofing,
        TradeType::Carpentry,
        TradeType::Concrete,
        TradeType::Masonry,
        TradeType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Electrical => "electrical",
            TradeType::Plumbing => "plumbing",
            TradeType::Hvac => "hvac",
            TradeType::Roofing => "roofing",
            TradeType::Carpentry => "carpentry",
            TradeType::Concrete => "concrete",
            TradeType::Masonry => "masonry",
            TradeType::General => "general",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        TradeType::ALL
            .iter()
            .find(|trade| trade.as_str() == normalized)
            .copied()
            .ok_or_else(|| ValidationError::UnknownTradeType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrewStatus {
    #[default]
    Available,
    Assigned,
    Unavailable,
}

impl CrewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrewStatus::Available => "available",
            CrewStatus::Assigned => "assigned",
            CrewStatus::Unavailable => "unavailable",
        }
    }
}

impl FromStr for CrewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(CrewStatus::Available),
            "assigned" => Ok(CrewStatus::Assigned),
            "unavailable" => Ok(CrewStatus::Unavailable),
            other => Err(format!("unknown crew status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeHint {
    Small,
    #[default]
    Medium,
    Large,
}

/// WGS84 coordinate. Constructed through `new` so out-of-range values are
/// rejected at the edge rather than inside the distance math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(ValidationError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }
}

/// Half-open `[start, end)` request window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::EmptyInterval { start, end });
        }
        Ok(Self { start, end })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceRecord {
    pub completed_projects: u32,
    /// 0.0 - 5.0
    pub average_rating: f64,
    /// 0.0 - 1.0
    pub on_time_rate: f64,
    pub safety_incidents: u32,
}

/// A bookable crew as loaded from the persistence collaborator. `skill_count`
/// is the aggregate over members and is recomputed upstream when membership
/// changes; this core treats it as read-only input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrewProfile {
    pub id: CrewId,
    pub name: String,
    pub specializations: Vec<TradeType>,
    pub base_location: Option<GeoPoint>,
    pub travel_radius_km: Option<f64>,
    pub skill_count: u32,
    pub performance: PerformanceRecord,
    pub status: CrewStatus,
    pub is_active: bool,
    pub booked_intervals: Vec<BookedInterval>,
}

/// Per-query requirement; never persisted by this core.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRequirement {
    pub trade_type: TradeType,
    pub location: Option<GeoPoint>,
    pub window: Option<TimeWindow>,
    pub urgency: Urgency,
    pub size_hint: SizeHint,
}

impl ProjectRequirement {
    pub fn for_trade(trade_type: TradeType) -> Self {
        Self {
            trade_type,
            location: None,
            window: None,
            urgency: Urgency::default(),
            size_hint: SizeHint::default(),
        }
    }
}
