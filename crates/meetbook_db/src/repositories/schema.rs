//! Table definitions shared by SQLite and PostgreSQL.
//!
//! Timestamps are stored as epoch milliseconds and flags as 0/1 so that every
//! column decodes through the `Any` driver without per-backend casts.

pub(crate) const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS meeting_types (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        duration_minutes BIGINT NOT NULL,
        meeting_kind TEXT NOT NULL,
        business_hours TEXT NOT NULL,
        is_active BIGINT NOT NULL DEFAULT 1,
        created_at BIGINT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_meeting_types_owner ON meeting_types (owner_id)",
    r#"
    CREATE TABLE IF NOT EXISTS bookings (
        id TEXT PRIMARY KEY,
        meeting_type_id TEXT NOT NULL,
        owner_id TEXT NOT NULL,
        attendee_name TEXT NOT NULL,
        attendee_email TEXT NOT NULL,
        message TEXT,
        scheduled_time BIGINT NOT NULL,
        end_time BIGINT NOT NULL,
        status TEXT NOT NULL,
        external_event_id TEXT,
        meeting_link TEXT,
        created_at BIGINT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_bookings_owner_time ON bookings (owner_id, scheduled_time)",
    "CREATE INDEX IF NOT EXISTS idx_bookings_meeting_type ON bookings (meeting_type_id)",
    // One row per owner. Bumping it serialises every check-and-write on that owner's timeline.
    r#"
    CREATE TABLE IF NOT EXISTS owner_locks (
        owner_id TEXT PRIMARY KEY,
        version BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS calendar_credentials (
        owner_id TEXT PRIMARY KEY,
        calendar_id TEXT NOT NULL,
        access_token TEXT,
        updated_at BIGINT NOT NULL
    )
    "#,
];
