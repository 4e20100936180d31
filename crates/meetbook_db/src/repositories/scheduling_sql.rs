//! SQL implementation of [`SchedulingRepository`].
//!
//! Booking writes that must not overlap run inside a transaction that first
//! bumps the owner's row in `owner_locks`. On SQLite that statement takes the
//! database write lock; on PostgreSQL it takes a row lock. Either way a second
//! writer for the same owner waits until the first commits, and then sees its
//! booking in the overlap count.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use meetbook_common::CalendarCredential;
use meetbook_scheduling::models::{
    Booking, BookingStatus, BusinessHours, MeetingKind, MeetingType, MeetingTypePatch,
};
use meetbook_scheduling::{
    BookingFilter, DeleteOutcome, SchedulingError, SchedulingRepository, SlotWrite,
};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

use crate::client::{DbClient, DbTransaction};
use crate::error::DbError;
use crate::repositories::schema::SCHEMA;

const MEETING_TYPE_COLUMNS: &str = "id, owner_id, title, description, duration_minutes, \
     meeting_kind, business_hours, is_active, created_at";

const BOOKING_COLUMNS: &str = "id, meeting_type_id, owner_id, attendee_name, attendee_email, \
     message, scheduled_time, end_time, status, external_event_id, meeting_link, created_at";

#[derive(Debug, Clone)]
pub struct SqlSchedulingRepository {
    db_client: DbClient,
}

impl SqlSchedulingRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Creates the tables and indexes when they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing scheduling schema");
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to apply schema statement: {}", e);
                    DbError::SqlxError(e)
                })?;
        }
        info!("Scheduling schema initialized successfully");
        Ok(())
    }

    pub fn db_client(&self) -> &DbClient {
        &self.db_client
    }

    async fn fetch_booking(&self, id: &str) -> Result<Option<Booking>, DbError> {
        let sql = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await?;
        row.as_ref().map(booking_from_row).transpose()
    }

    async fn fetch_meeting_type(&self, id: &str) -> Result<Option<MeetingType>, DbError> {
        let sql = format!("SELECT {} FROM meeting_types WHERE id = $1", MEETING_TYPE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await?;
        row.as_ref().map(meeting_type_from_row).transpose()
    }

    async fn fetch_bookings(
        &self,
        key_column: &'static str,
        key: &str,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, DbError> {
        let (clause, status) = filter_clause(filter);
        let sql = format!(
            "SELECT {} FROM bookings WHERE {} = $1{} ORDER BY scheduled_time, id",
            BOOKING_COLUMNS, key_column, clause
        );
        let mut query = sqlx::query(&sql).bind(key);
        if let Some(status) = status {
            query = query.bind(status);
        }
        let rows = query.fetch_all(self.db_client.pool()).await?;
        rows.iter().map(booking_from_row).collect()
    }
}

/// Takes the per-owner write lock for the rest of `tx`.
///
/// The insert is a write as well, so on SQLite the transaction holds the write
/// lock from its first statement and never has to upgrade from a read lock.
async fn lock_owner(tx: &mut DbTransaction<'_>, owner_id: &str) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO owner_locks (owner_id, version) VALUES ($1, 0) \
         ON CONFLICT (owner_id) DO NOTHING",
    )
    .bind(owner_id)
    .execute(&mut **tx)
    .await?;
    sqlx::query("UPDATE owner_locks SET version = version + 1 WHERE owner_id = $1")
        .bind(owner_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Non-cancelled bookings of `owner_id` overlapping `[start, end)`, ignoring `exclude_id`.
async fn count_overlaps(
    tx: &mut DbTransaction<'_>,
    owner_id: &str,
    exclude_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<i64, DbError> {
    let row = sqlx::query(
        "SELECT COUNT(*) AS n FROM bookings \
         WHERE owner_id = $1 AND id <> $2 AND status <> 'cancelled' \
         AND scheduled_time < $3 AND end_time > $4",
    )
    .bind(owner_id)
    .bind(exclude_id)
    .bind(end.timestamp_millis())
    .bind(start.timestamp_millis())
    .fetch_one(&mut **tx)
    .await?;
    Ok(row.try_get::<i64, _>("n")?)
}

fn filter_clause(filter: BookingFilter) -> (&'static str, Option<&'static str>) {
    match filter {
        BookingFilter::All => ("", None),
        BookingFilter::Active => (" AND status <> 'cancelled'", None),
        BookingFilter::Status(status) => (" AND status = $2", Some(status.as_str())),
    }
}

fn timestamp(table: &'static str, millis: i64) -> Result<DateTime<Utc>, DbError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| DbError::corrupt(table, format!("timestamp {} out of range", millis)))
}

fn meeting_type_from_row(row: &AnyRow) -> Result<MeetingType, DbError> {
    const TABLE: &str = "meeting_types";
    let kind: String = row.try_get("meeting_kind")?;
    let hours: String = row.try_get("business_hours")?;
    let duration: i64 = row.try_get("duration_minutes")?;
    Ok(MeetingType {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        duration_minutes: u32::try_from(duration)
            .map_err(|_| DbError::corrupt(TABLE, format!("duration {}", duration)))?,
        meeting_kind: MeetingKind::parse(&kind)
            .ok_or_else(|| DbError::corrupt(TABLE, format!("meeting kind {:?}", kind)))?,
        business_hours: serde_json::from_str::<BusinessHours>(&hours)
            .map_err(|e| DbError::corrupt(TABLE, e))?,
        is_active: row.try_get::<i64, _>("is_active")? != 0,
        created_at: timestamp(TABLE, row.try_get("created_at")?)?,
    })
}

fn booking_from_row(row: &AnyRow) -> Result<Booking, DbError> {
    const TABLE: &str = "bookings";
    let status: String = row.try_get("status")?;
    Ok(Booking {
        id: row.try_get("id")?,
        meeting_type_id: row.try_get("meeting_type_id")?,
        owner_id: row.try_get("owner_id")?,
        attendee_name: row.try_get("attendee_name")?,
        attendee_email: row.try_get("attendee_email")?,
        message: row.try_get("message")?,
        scheduled_time: timestamp(TABLE, row.try_get("scheduled_time")?)?,
        end_time: timestamp(TABLE, row.try_get("end_time")?)?,
        status: BookingStatus::parse(&status)
            .ok_or_else(|| DbError::corrupt(TABLE, format!("status {:?}", status)))?,
        external_event_id: row.try_get("external_event_id")?,
        meeting_link: row.try_get("meeting_link")?,
        created_at: timestamp(TABLE, row.try_get("created_at")?)?,
    })
}

fn business_hours_json(hours: &BusinessHours) -> Result<String, DbError> {
    serde_json::to_string(hours).map_err(|e| DbError::corrupt("meeting_types", e))
}

#[async_trait]
impl SchedulingRepository for SqlSchedulingRepository {
    async fn get_meeting_type(&self, id: &str) -> Result<Option<MeetingType>, SchedulingError> {
        Ok(self.fetch_meeting_type(id).await?)
    }

    async fn list_meeting_types_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<MeetingType>, SchedulingError> {
        let sql = format!(
            "SELECT {} FROM meeting_types WHERE owner_id = $1 ORDER BY created_at, id",
            MEETING_TYPE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(DbError::from)?;
        Ok(rows
            .iter()
            .map(meeting_type_from_row)
            .collect::<Result<_, _>>()?)
    }

    async fn list_all_meeting_types(&self) -> Result<Vec<MeetingType>, SchedulingError> {
        let sql = format!(
            "SELECT {} FROM meeting_types ORDER BY created_at, id",
            MEETING_TYPE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(DbError::from)?;
        Ok(rows
            .iter()
            .map(meeting_type_from_row)
            .collect::<Result<_, _>>()?)
    }

    async fn insert_meeting_type(&self, meeting_type: &MeetingType) -> Result<(), SchedulingError> {
        debug!("Inserting meeting type {}", meeting_type.id);
        sqlx::query(
            "INSERT INTO meeting_types (id, owner_id, title, description, duration_minutes, \
             meeting_kind, business_hours, is_active, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&meeting_type.id)
        .bind(&meeting_type.owner_id)
        .bind(&meeting_type.title)
        .bind(meeting_type.description.as_deref())
        .bind(i64::from(meeting_type.duration_minutes))
        .bind(meeting_type.meeting_kind.as_str())
        .bind(business_hours_json(&meeting_type.business_hours)?)
        .bind(i64::from(meeting_type.is_active))
        .bind(meeting_type.created_at.timestamp_millis())
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to insert meeting type {}: {}", meeting_type.id, e);
            DbError::SqlxError(e)
        })?;
        Ok(())
    }

    async fn patch_meeting_type(
        &self,
        id: &str,
        patch: &MeetingTypePatch,
    ) -> Result<Option<MeetingType>, SchedulingError> {
        let hours = patch
            .business_hours
            .as_ref()
            .map(business_hours_json)
            .transpose()?;
        // A single statement keeps untouched columns as they are. An empty description clears it.
        let result = sqlx::query(
            "UPDATE meeting_types SET \
             title = COALESCE($1, title), \
             description = CASE WHEN $2 IS NULL THEN description WHEN $2 = '' THEN NULL ELSE $2 END, \
             duration_minutes = COALESCE($3, duration_minutes), \
             meeting_kind = COALESCE($4, meeting_kind), \
             business_hours = COALESCE($5, business_hours), \
             is_active = COALESCE($6, is_active) \
             WHERE id = $7",
        )
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.duration_minutes.map(i64::from))
        .bind(patch.meeting_kind.map(|k| k.as_str()))
        .bind(hours)
        .bind(patch.is_active.map(i64::from))
        .bind(id)
        .execute(self.db_client.pool())
        .await
        .map_err(DbError::from)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(self.fetch_meeting_type(id).await?)
    }

    async fn delete_meeting_type(&self, id: &str) -> Result<DeleteOutcome, SchedulingError> {
        // owner_id never changes, so it can be read before taking the lock.
        let Some(meeting_type) = self.fetch_meeting_type(id).await? else {
            return Ok(DeleteOutcome::Missing);
        };

        let mut tx = self.db_client.begin().await?;
        lock_owner(&mut tx, &meeting_type.owner_id).await?;
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM bookings \
             WHERE meeting_type_id = $1 AND status <> 'cancelled'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from)?;
        let count: i64 = row.try_get("n").map_err(DbError::from)?;
        if count > 0 {
            tx.rollback().await.map_err(DbError::from)?;
            return Ok(DeleteOutcome::Blocked {
                count: usize::try_from(count).unwrap_or(usize::MAX),
            });
        }

        let deleted = sqlx::query("DELETE FROM meeting_types WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?
            .rows_affected();
        tx.commit().await.map_err(DbError::from)?;

        if deleted == 0 {
            Ok(DeleteOutcome::Missing)
        } else {
            info!("Deleted meeting type {}", id);
            Ok(DeleteOutcome::Deleted)
        }
    }

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, SchedulingError> {
        Ok(self.fetch_booking(id).await?)
    }

    async fn list_bookings_for_owner(
        &self,
        owner_id: &str,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, SchedulingError> {
        Ok(self.fetch_bookings("owner_id", owner_id, filter).await?)
    }

    async fn list_bookings_for_meeting_type(
        &self,
        meeting_type_id: &str,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, SchedulingError> {
        Ok(self
            .fetch_bookings("meeting_type_id", meeting_type_id, filter)
            .await?)
    }

    async fn insert_booking_if_slot_free(
        &self,
        booking: Booking,
    ) -> Result<SlotWrite, SchedulingError> {
        let mut tx = self.db_client.begin().await?;
        lock_owner(&mut tx, &booking.owner_id).await?;

        let overlapping = count_overlaps(
            &mut tx,
            &booking.owner_id,
            &booking.id,
            booking.scheduled_time,
            booking.end_time,
        )
        .await?;
        if overlapping > 0 {
            debug!(
                "Slot {} - {} already taken for owner {}",
                booking.scheduled_time, booking.end_time, booking.owner_id
            );
            tx.rollback().await.map_err(DbError::from)?;
            return Ok(SlotWrite::SlotTaken);
        }

        sqlx::query(
            "INSERT INTO bookings (id, meeting_type_id, owner_id, attendee_name, attendee_email, \
             message, scheduled_time, end_time, status, external_event_id, meeting_link, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&booking.id)
        .bind(&booking.meeting_type_id)
        .bind(&booking.owner_id)
        .bind(&booking.attendee_name)
        .bind(&booking.attendee_email)
        .bind(booking.message.as_deref())
        .bind(booking.scheduled_time.timestamp_millis())
        .bind(booking.end_time.timestamp_millis())
        .bind(booking.status.as_str())
        .bind(booking.external_event_id.as_deref())
        .bind(booking.meeting_link.as_deref())
        .bind(booking.created_at.timestamp_millis())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to insert booking {}: {}", booking.id, e);
            DbError::SqlxError(e)
        })?;
        tx.commit().await.map_err(DbError::from)?;

        info!("Booking {} stored for owner {}", booking.id, booking.owner_id);
        Ok(SlotWrite::Written(booking))
    }

    async fn reactivate_booking_if_slot_free(
        &self,
        booking_id: &str,
    ) -> Result<SlotWrite, SchedulingError> {
        // Owner and interval of a booking are immutable.
        let booking = self
            .fetch_booking(booking_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("booking", booking_id))?;

        let mut tx = self.db_client.begin().await?;
        lock_owner(&mut tx, &booking.owner_id).await?;
        let overlapping = count_overlaps(
            &mut tx,
            &booking.owner_id,
            &booking.id,
            booking.scheduled_time,
            booking.end_time,
        )
        .await?;
        if overlapping > 0 {
            tx.rollback().await.map_err(DbError::from)?;
            return Ok(SlotWrite::SlotTaken);
        }
        sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2")
            .bind(BookingStatus::Scheduled.as_str())
            .bind(booking_id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        tx.commit().await.map_err(DbError::from)?;

        info!("Booking {} restored", booking_id);
        Ok(SlotWrite::Written(Booking {
            status: BookingStatus::Scheduled,
            ..booking
        }))
    }

    async fn patch_booking_status(
        &self,
        id: &str,
        status: BookingStatus,
    ) -> Result<Option<Booking>, SchedulingError> {
        let result = sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(DbError::from)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        debug!("Booking {} moved to {}", id, status);
        Ok(self.fetch_booking(id).await?)
    }

    async fn set_calendar_event(
        &self,
        booking_id: &str,
        external_event_id: &str,
        meeting_link: Option<&str>,
    ) -> Result<(), SchedulingError> {
        let result = sqlx::query(
            "UPDATE bookings SET external_event_id = $1, meeting_link = $2 WHERE id = $3",
        )
        .bind(external_event_id)
        .bind(meeting_link)
        .bind(booking_id)
        .execute(self.db_client.pool())
        .await
        .map_err(DbError::from)?;
        if result.rows_affected() == 0 {
            return Err(SchedulingError::not_found("booking", booking_id));
        }
        Ok(())
    }

    async fn get_calendar_credential(
        &self,
        owner_id: &str,
    ) -> Result<Option<CalendarCredential>, SchedulingError> {
        let row = sqlx::query(
            "SELECT calendar_id, access_token FROM calendar_credentials WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(DbError::from)?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(CalendarCredential {
            calendar_id: row.try_get("calendar_id").map_err(DbError::from)?,
            access_token: row.try_get("access_token").map_err(DbError::from)?,
        }))
    }

    async fn put_calendar_credential(
        &self,
        owner_id: &str,
        credential: &CalendarCredential,
        updated_at: DateTime<Utc>,
    ) -> Result<(), SchedulingError> {
        sqlx::query(
            "INSERT INTO calendar_credentials (owner_id, calendar_id, access_token, updated_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (owner_id) DO UPDATE SET \
             calendar_id = excluded.calendar_id, \
             access_token = excluded.access_token, \
             updated_at = excluded.updated_at",
        )
        .bind(owner_id)
        .bind(&credential.calendar_id)
        .bind(credential.access_token.as_deref())
        .bind(updated_at.timestamp_millis())
        .execute(self.db_client.pool())
        .await
        .map_err(DbError::from)?;
        info!("Calendar credential stored for owner {}", owner_id);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), SchedulingError> {
        if self.db_client.is_healthy().await {
            Ok(())
        } else {
            Err(SchedulingError::Storage("database is unreachable".to_string()))
        }
    }
}
