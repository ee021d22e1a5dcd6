use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{CrewId, CrewProfile, CrewStatus};

/// A confirmed booking over a half-open `[start, end)` range.
#[derive(Debug, Clone, PartialEq)]
pub struct BookedInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub project_id: String,
}

/// Half-open interval overlap: `[s1,e1)` and `[s2,e2)` overlap iff
/// `s1 < e2 && s2 < e1`. Touching endpoints do not conflict.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// First booked interval overlapping `[start, end)`, if any.
pub fn first_conflict<'a>(
    intervals: &'a [BookedInterval],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<&'a BookedInterval> {
    intervals
        .iter()
        .find(|booked| intervals_overlap(start, end, booked.start, booked.end))
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("crew {crew_id} already booked by project {existing_project} over {start}..{end}")]
pub struct ConflictError {
    pub crew_id: CrewId,
    pub existing_project: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct CrewSchedule {
    status: CrewStatus,
    intervals: Vec<BookedInterval>,
}

/// In-memory schedule book keyed by crew id. Sole gatekeeper for the
/// invariant that a crew never holds two overlapping intervals: the
/// check-then-insert in `book` runs under one lock, so two concurrent
/// callers cannot both win an overlapping window.
///
/// Ranking queries read a snapshot built via `from_profiles`; staleness
/// against a concurrent booking is acceptable because the booking path is
/// the authoritative check.
#[derive(Debug, Default)]
pub struct AvailabilityIndex {
    inner: Mutex<HashMap<CrewId, CrewSchedule>>,
}

impl AvailabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the index from crew snapshots loaded out of the document store.
    pub fn from_profiles(profiles: &[CrewProfile]) -> Self {
        let mut inner = HashMap::with_capacity(profiles.len());
        for profile in profiles {
            let mut intervals = profile.booked_intervals.clone();
            intervals.sort_by_key(|interval| interval.start);
            inner.insert(
                profile.id,
                CrewSchedule {
                    status: profile.status,
                    intervals,
                },
            );
        }
        Self {
            inner: Mutex::new(inner),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CrewId, CrewSchedule>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True iff any booked interval for `crew_id` overlaps `[start, end)`.
    pub fn has_conflict(&self, crew_id: CrewId, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.lock()
            .get(&crew_id)
            .is_some_and(|schedule| first_conflict(&schedule.intervals, start, end).is_some())
    }

    /// Insert a booking and mark the crew assigned. Fails with
    /// `ConflictError` when the window overlaps an existing interval.
    /// Zero-length windows are rejected upstream by validation and must not
    /// reach this point.
    pub fn book(
        &self,
        crew_id: CrewId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        project_id: &str,
    ) -> Result<(), ConflictError> {
        debug_assert!(start < end, "empty intervals are rejected by validation");

        let mut inner = self.lock();
        let schedule = inner.entry(crew_id).or_default();

        if let Some(existing) = first_conflict(&schedule.intervals, start, end) {
            return Err(ConflictError {
                crew_id,
                existing_project: existing.project_id.clone(),
                start: existing.start,
                end: existing.end,
            });
        }

        let position = schedule
            .intervals
            .partition_point(|interval| interval.start < start);
        schedule.intervals.insert(
            position,
            BookedInterval {
                start,
                end,
                project_id: project_id.to_string(),
            },
        );
        schedule.status = CrewStatus::Assigned;
        Ok(())
    }

    /// Remove the booking matching `project_id`. Idempotent: releasing a
    /// booking that does not exist is a no-op. When no intervals remain the
    /// crew flips back to available.
    pub fn release(&self, crew_id: CrewId, project_id: &str) {
        let mut inner = self.lock();
        let Some(schedule) = inner.get_mut(&crew_id) else {
            return;
        };

        schedule
            .intervals
            .retain(|interval| interval.project_id != project_id);
        if schedule.intervals.is_empty() {
            schedule.status = CrewStatus::Available;
        }
    }

    pub fn status(&self, crew_id: CrewId) -> CrewStatus {
        self.lock()
            .get(&crew_id)
            .map(|schedule| schedule.status)
            .unwrap_or_default()
    }

    pub fn booked_intervals(&self, crew_id: CrewId) -> Vec<BookedInterval> {
        self.lock()
            .get(&crew_id)
            .map(|schedule| schedule.intervals.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    #[test]
    fn overlap_test_is_symmetric() {
        let pairs = [
            ((at(9, 0), at(11, 0)), (at(10, 0), at(12, 0))),
            ((at(9, 0), at(10, 0)), (at(10, 0), at(11, 0))),
            ((at(9, 0), at(12, 0)), (at(10, 0), at(11, 0))),
            ((at(9, 0), at(9, 30)), (at(14, 0), at(15, 0))),
        ];

        for ((a_start, a_end), (b_start, b_end)) in pairs {
            assert_eq!(
                intervals_overlap(a_start, a_end, b_start, b_end),
                intervals_overlap(b_start, b_end, a_start, a_end),
            );
        }
    }

    #[test]
    fn touching_boundaries_do_not_conflict() {
        let index = AvailabilityIndex::new();
        index.book(1, at(10, 0), at(11, 0), "p1").unwrap();

        assert!(!index.has_conflict(1, at(11, 0), at(12, 0)));
        assert!(!index.has_conflict(1, at(9, 0), at(10, 0)));
    }

    #[test]
    fn second_overlapping_booking_fails_and_leaves_one_interval() {
        let index = AvailabilityIndex::new();
        index.book(7, at(10, 0), at(11, 0), "p1").unwrap();

        let err = index.book(7, at(10, 30), at(11, 30), "p2").unwrap_err();
        assert_eq!(err.crew_id, 7);
        assert_eq!(err.existing_project, "p1");

        let intervals = index.booked_intervals(7);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].project_id, "p1");
    }

    #[test]
    fn booking_marks_crew_assigned_and_release_restores_availability() {
        let index = AvailabilityIndex::new();
        index.book(3, at(8, 0), at(12, 0), "p1").unwrap();
        assert_eq!(index.status(3), CrewStatus::Assigned);

        index.release(3, "p1");
        assert_eq!(index.status(3), CrewStatus::Available);
        assert!(index.booked_intervals(3).is_empty());
    }

    #[test]
    fn release_of_unknown_booking_is_idempotent() {
        let index = AvailabilityIndex::new();
        index.book(5, at(10, 0), at(11, 0), "p1").unwrap();

        index.release(5, "nonexistent");
        index.release(5, "nonexistent");
        index.release(999, "nonexistent");

        assert_eq!(index.booked_intervals(5).len(), 1);
        assert_eq!(index.status(5), CrewStatus::Assigned);
    }

    #[test]
    fn releasing_one_of_two_bookings_keeps_crew_assigned() {
        let index = AvailabilityIndex::new();
        index.book(4, at(9, 0), at(10, 0), "p1").unwrap();
        index.book(4, at(13, 0), at(15, 0), "p2").unwrap();

        index.release(4, "p1");
        assert_eq!(index.status(4), CrewStatus::Assigned);
        assert_eq!(index.booked_intervals(4).len(), 1);
    }

    #[test]
    fn intervals_stay_ordered_by_start() {
        let index = AvailabilityIndex::new();
        index.book(2, at(14, 0), at(15, 0), "late").unwrap();
        index.book(2, at(9, 0), at(10, 0), "early").unwrap();
        index.book(2, at(11, 0), at(12, 0), "mid").unwrap();

        let starts: Vec<_> = index
            .booked_intervals(2)
            .iter()
            .map(|interval| interval.start)
            .collect();
        assert_eq!(starts, vec![at(9, 0), at(11, 0), at(14, 0)]);
    }

    #[test]
    fn snapshot_index_reflects_loaded_bookings() {
        let crew = CrewProfile {
            id: 11,
            status: CrewStatus::Available,
            booked_intervals: vec![BookedInterval {
                start: at(10, 0),
                end: at(12, 0),
                project_id: "p9".into(),
            }],
            ..CrewProfile::default()
        };

        let index = AvailabilityIndex::from_profiles(&[crew]);
        assert!(index.has_conflict(11, at(11, 0), at(13, 0)));
        assert!(!index.has_conflict(11, at(12, 0), at(13, 0)));
    }
}
