//! PostgreSQL implementation of the event store.
//!
//! A registration unit is a transaction that starts with
//! `SELECT ... FOR UPDATE` on the event row. The row lock serializes units
//! for the same event under PostgreSQL's default READ COMMITTED isolation,
//! and the `attendees_event_id_email_key` constraint rejects duplicate
//! emails even if a caller skipped its own check.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{AttendeeSlice, EventStore, RegistrationUnit, StoreError};
use crate::config::AppConfig;
use crate::domain::{Attendee, AttendeeId, Event, EventId, EventSnapshot};

type EventRow = (
    Uuid,
    String,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
    i32,
    DateTime<Utc>,
    DateTime<Utc>,
);

type EventCountRow = (
    Uuid,
    String,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
    i32,
    DateTime<Utc>,
    DateTime<Utc>,
    i64,
);

type AttendeeRow = (Uuid, Uuid, String, String, DateTime<Utc>);

const EVENT_COLUMNS: &str =
    "id, name, location, start_time, end_time, max_capacity, created_at, updated_at";

const EVENT_WITH_COUNT: &str = "SELECT e.id, e.name, e.location, e.start_time, e.end_time, \
     e.max_capacity, e.created_at, e.updated_at, COUNT(a.id) \
     FROM events e LEFT JOIN attendees a ON a.event_id = e.id";

const ATTENDEE_COLUMNS: &str = "id, event_id, name, email, registered_at";

/// PostgreSQL-backed [`EventStore`] using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized and timed from `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError::Database`] if the database is unreachable.
    pub async fn connect(config: &AppConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError::Migration`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn insert_event(&self, event: &Event) -> Result<Event, StoreError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "INSERT INTO events (id, name, location, start_time, end_time, max_capacity, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {EVENT_COLUMNS}"
        ))
        .bind(*event.id.as_uuid())
        .bind(&event.name)
        .bind(&event.location)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(capacity_to_db(event.max_capacity)?)
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(&self.pool)
        .await?;

        event_from_row(row)
    }

    async fn get_event(&self, id: EventId) -> Result<Option<EventSnapshot>, StoreError> {
        let row = sqlx::query_as::<_, EventCountRow>(&format!(
            "{EVENT_WITH_COUNT} WHERE e.id = $1 GROUP BY e.id"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(snapshot_from_row).transpose()
    }

    async fn list_upcoming(&self, after: DateTime<Utc>) -> Result<Vec<EventSnapshot>, StoreError> {
        let rows = sqlx::query_as::<_, EventCountRow>(&format!(
            "{EVENT_WITH_COUNT} WHERE e.start_time > $1 GROUP BY e.id \
             ORDER BY e.start_time ASC, e.created_at ASC, e.id ASC"
        ))
        .bind(after)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(snapshot_from_row).collect()
    }

    async fn attendee_page(
        &self,
        event_id: EventId,
        offset: u64,
        limit: u32,
    ) -> Result<Option<AttendeeSlice>, StoreError> {
        let mut tx = self.pool.begin().await?;
        // Count and page must come from the same snapshot.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM events WHERE id = $1)")
                .bind(*event_id.as_uuid())
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            tx.rollback().await?;
            return Ok(None);
        }

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendees WHERE event_id = $1")
            .bind(*event_id.as_uuid())
            .fetch_one(&mut *tx)
            .await?;

        let rows = sqlx::query_as::<_, AttendeeRow>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE event_id = $1 \
             ORDER BY registered_at ASC, seq ASC OFFSET $2 LIMIT $3"
        ))
        .bind(*event_id.as_uuid())
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .bind(i64::from(limit))
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(AttendeeSlice {
            items: rows.into_iter().map(attendee_from_row).collect(),
            total_count: count_from_db(total)?,
        }))
    }

    async fn delete_event(&self, id: EventId) -> Result<bool, StoreError> {
        // attendees rows go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn begin_registration(
        &self,
        event_id: EventId,
    ) -> Result<Option<Box<dyn RegistrationUnit>>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(*event_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        Ok(Some(Box::new(PgRegistrationUnit {
            tx,
            event: event_from_row(row)?,
        })))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.pool.is_closed() {
            return Err(StoreError::Unavailable("connection pool closed".to_string()));
        }
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Registration unit backed by an open transaction holding the event's
/// row lock. Dropping it rolls the transaction back.
struct PgRegistrationUnit {
    tx: Transaction<'static, Postgres>,
    event: Event,
}

impl fmt::Debug for PgRegistrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgRegistrationUnit")
            .field("event_id", &self.event.id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RegistrationUnit for PgRegistrationUnit {
    fn event(&self) -> &Event {
        &self.event
    }

    async fn attendee_count(&mut self) -> Result<u32, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendees WHERE event_id = $1")
            .bind(*self.event.id.as_uuid())
            .fetch_one(&mut *self.tx)
            .await?;
        count_from_db(count)
    }

    async fn email_registered(&mut self, email: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM attendees WHERE event_id = $1 AND email = $2)",
        )
        .bind(*self.event.id.as_uuid())
        .bind(email)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    async fn insert_attendee(&mut self, attendee: &Attendee) -> Result<Attendee, StoreError> {
        let row = sqlx::query_as::<_, AttendeeRow>(&format!(
            "INSERT INTO attendees (id, event_id, name, email, registered_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ATTENDEE_COLUMNS}"
        ))
        .bind(*attendee.id.as_uuid())
        .bind(*attendee.event_id.as_uuid())
        .bind(&attendee.name)
        .bind(&attendee.email)
        .bind(attendee.registered_at)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(attendee_from_row(row))
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

fn capacity_to_db(capacity: u32) -> Result<i32, StoreError> {
    i32::try_from(capacity)
        .map_err(|_| StoreError::Corrupt(format!("max_capacity {capacity} exceeds i32::MAX")))
}

fn count_from_db(count: i64) -> Result<u32, StoreError> {
    u32::try_from(count).map_err(|_| StoreError::Corrupt(format!("attendee count {count}")))
}

fn event_from_row(
    (id, name, location, start_time, end_time, max_capacity, created_at, updated_at): EventRow,
) -> Result<Event, StoreError> {
    let max_capacity = u32::try_from(max_capacity)
        .map_err(|_| StoreError::Corrupt(format!("max_capacity {max_capacity} for event {id}")))?;
    Ok(Event {
        id: EventId::from_uuid(id),
        name,
        location,
        start_time,
        end_time,
        max_capacity,
        created_at,
        updated_at,
    })
}

fn snapshot_from_row(
    (id, name, location, start_time, end_time, max_capacity, created_at, updated_at, count): EventCountRow,
) -> Result<EventSnapshot, StoreError> {
    let event = event_from_row((
        id,
        name,
        location,
        start_time,
        end_time,
        max_capacity,
        created_at,
        updated_at,
    ))?;
    Ok(EventSnapshot {
        event,
        attendee_count: count_from_db(count)?,
    })
}

fn attendee_from_row((id, event_id, name, email, registered_at): AttendeeRow) -> Attendee {
    Attendee {
        id: AttendeeId::from_uuid(id),
        event_id: EventId::from_uuid(event_id),
        name,
        email,
        registered_at,
    }
}
