//! Persistence layer: the event store and its atomic registration unit.
//!
//! [`EventStore`] is the only way services reach state. Two
//! implementations are provided: [`memory::MemoryEventStore`] (per-event
//! `tokio` mutexes) and [`postgres::PostgresEventStore`] (`sqlx::PgPool`,
//! row locks). Both enforce `(event_id, email)` uniqueness on their own,
//! whatever the caller checked beforehand.

pub mod memory;
pub mod postgres;

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Attendee, Event, EventId, EventSnapshot};

pub use memory::MemoryEventStore;
pub use postgres::PostgresEventStore;

/// Storage-layer failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The backing database reported an error.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Schema migration failed.
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be mapped onto the domain model.
    #[error("corrupt stored value: {0}")]
    Corrupt(String),

    /// The store is not able to serve requests.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::UniqueViolation(
                db.constraint()
                    .map_or_else(|| db.message().to_string(), str::to_string),
            ),
            _ => Self::Database(err),
        }
    }
}

/// Attendees on one page plus the total for the event, read together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeSlice {
    /// Attendees in registration order.
    pub items: Vec<Attendee>,
    /// Number of attendees registered for the event.
    pub total_count: u32,
}

/// Durable record of events and their attendee lists.
#[async_trait]
pub trait EventStore: Debug + Send + Sync {
    /// Stores a fully validated event atomically.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the write fails; nothing is stored.
    async fn insert_event(&self, event: &Event) -> Result<Event, StoreError>;

    /// Loads an event with its current attendee count.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on backend failure.
    async fn get_event(&self, id: EventId) -> Result<Option<EventSnapshot>, StoreError>;

    /// Lists events starting strictly after `after`, by start time ascending.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on backend failure.
    async fn list_upcoming(&self, after: DateTime<Utc>) -> Result<Vec<EventSnapshot>, StoreError>;

    /// Reads `limit` attendees of `event_id` after skipping `offset`, in
    /// registration order, together with the total count.
    ///
    /// Returns `None` if the event does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on backend failure.
    async fn attendee_page(
        &self,
        event_id: EventId,
        offset: u64,
        limit: u32,
    ) -> Result<Option<AttendeeSlice>, StoreError>;

    /// Removes an event and all of its attendees. Returns `false` if the
    /// event did not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on backend failure.
    async fn delete_event(&self, id: EventId) -> Result<bool, StoreError>;

    /// Opens the atomic registration unit for one event.
    ///
    /// The returned unit holds the event's exclusive lock until it is
    /// committed or dropped; other registrations for the same event wait,
    /// registrations for other events do not. Returns `None` if the event
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the unit cannot be opened.
    async fn begin_registration(
        &self,
        event_id: EventId,
    ) -> Result<Option<Box<dyn RegistrationUnit>>, StoreError>;

    /// Checks that the backend can serve requests.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be reached.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// An open, isolated read-check-write sequence on one event.
///
/// Dropping a unit without calling [`RegistrationUnit::commit`] discards
/// every write made through it.
#[async_trait]
pub trait RegistrationUnit: Debug + Send {
    /// The locked event, as read when the unit opened.
    fn event(&self) -> &Event;

    /// Counts attendees as seen inside the unit.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on backend failure.
    async fn attendee_count(&mut self) -> Result<u32, StoreError>;

    /// Returns `true` if `email` is already registered for the event.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on backend failure.
    async fn email_registered(&mut self, email: &str) -> Result<bool, StoreError>;

    /// Stages a new attendee, returning the record as stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UniqueViolation`] if the email is already
    /// registered for the event, or another [`StoreError`] on failure.
    async fn insert_attendee(&mut self, attendee: &Attendee) -> Result<Attendee, StoreError>;

    /// Makes every staged write visible and releases the lock.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the commit fails; nothing is made
    /// visible in that case.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
