/// `cm.crews` — crew roster with performance aggregates. Soft-deleted via
/// `is_active`; rows are never dropped while bookings reference them.
pub const CREWS_DDL: &str = r#"
CREATE TABLE cm.crews (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    specializations TEXT[] NOT NULL DEFAULT '{}',

    base_lat DOUBLE PRECISION,
    base_lng DOUBLE PRECISION,
    travel_radius_km DOUBLE PRECISION,

    skill_count INTEGER NOT NULL DEFAULT 0,
    completed_projects INTEGER NOT NULL DEFAULT 0,
    average_rating DOUBLE PRECISION NOT NULL DEFAULT 0,
    on_time_rate DOUBLE PRECISION NOT NULL DEFAULT 0,
    safety_incidents INTEGER NOT NULL DEFAULT 0,

    status VARCHAR(20) NOT NULL DEFAULT 'available',
    is_active BOOLEAN NOT NULL DEFAULT true,

    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_crew_status CHECK (status IN ('available', 'assigned', 'unavailable')),
    CONSTRAINT chk_average_rating CHECK (average_rating >= 0 AND average_rating <= 5),
    CONSTRAINT chk_on_time_rate CHECK (on_time_rate >= 0 AND on_time_rate <= 1),
    CONSTRAINT chk_counts_non_negative CHECK (
        skill_count >= 0 AND completed_projects >= 0 AND safety_incidents >= 0
    ),
    CONSTRAINT chk_coordinate_pair CHECK (
        (base_lat IS NULL) = (base_lng IS NULL)
    )
);

CREATE INDEX idx_crews_specializations ON cm.crews USING gin(specializations);
CREATE INDEX idx_crews_active_status ON cm.crews(status) WHERE is_active;
"#;

/// `cm.crew_bookings` — booked intervals, one row per (crew, project).
/// The exclusion constraint is the database-side mirror of the overlap
/// invariant: two committed rows for the same crew can never overlap, even
/// under concurrent writers. Requires the btree_gist extension.
pub const CREW_BOOKINGS_DDL: &str = r#"
CREATE TABLE cm.crew_bookings (
    id BIGSERIAL PRIMARY KEY,
    crew_id BIGINT NOT NULL REFERENCES cm.crews(id),
    project_id VARCHAR(64) NOT NULL,
    start_at TIMESTAMPTZ NOT NULL,
    end_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_booking_window CHECK (start_at < end_at),
    CONSTRAINT uq_crew_project UNIQUE (crew_id, project_id),
    CONSTRAINT excl_crew_booking_overlap EXCLUDE USING gist (
        crew_id WITH =,
        tstzrange(start_at, end_at) WITH &&
    )
);

CREATE INDEX idx_crew_bookings_crew_start ON cm.crew_bookings(crew_id, start_at);
CREATE INDEX idx_crew_bookings_project ON cm.crew_bookings(project_id);
"#;
