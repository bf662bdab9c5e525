//! Event records, creation input, and derived attendance figures.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::EventId;
use super::validation::{ValidationErrors, check_text};

/// Maximum length of an event name, in characters.
pub const MAX_EVENT_NAME_LEN: usize = 200;

/// Maximum length of an event location, in characters.
pub const MAX_LOCATION_LEN: usize = 300;

/// Largest capacity an event may be created with.
pub const MAX_EVENT_CAPACITY: u32 = 10_000;

/// Longest allowed span between start and end, in days.
pub const MAX_EVENT_DURATION_DAYS: i64 = 7;

/// A stored event.
///
/// Immutable once created. The attendee list is owned by the store and
/// never cached here; see [`EventSnapshot`] for counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// Display name.
    pub name: String,
    /// Venue or address.
    pub location: String,
    /// When the event begins.
    pub start_time: DateTime<Utc>,
    /// When the event ends.
    pub end_time: DateTime<Utc>,
    /// Maximum number of attendees (at least 1).
    pub max_capacity: u32,
    /// Creation timestamp (system-managed).
    pub created_at: DateTime<Utc>,
    /// Last update timestamp (system-managed).
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Returns `true` if the event starts strictly after `now`.
    #[must_use]
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now
    }
}

/// Caller-supplied fields for a new event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Display name.
    pub name: String,
    /// Venue or address.
    pub location: String,
    /// When the event begins.
    pub start_time: DateTime<Utc>,
    /// When the event ends.
    pub end_time: DateTime<Utc>,
    /// Maximum number of attendees.
    pub max_capacity: u32,
}

impl NewEvent {
    /// Validates every event invariant against the clock reading `now`
    /// and builds the record to store.
    ///
    /// Text fields are trimmed before they are checked and stored.
    ///
    /// # Errors
    ///
    /// Returns all field-level failures found: blank or over-long text,
    /// capacity outside `1..=10_000`, `start_time` not strictly in the
    /// future, `start_time >= end_time`, or a span longer than seven days.
    pub fn validate(self, now: DateTime<Utc>) -> Result<Event, ValidationErrors> {
        let name = self.name.trim().to_string();
        let location = self.location.trim().to_string();

        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "name", &name, MAX_EVENT_NAME_LEN);
        check_text(&mut errors, "location", &location, MAX_LOCATION_LEN);

        if self.max_capacity < 1 {
            errors.push("max_capacity", "must be at least 1");
        } else if self.max_capacity > MAX_EVENT_CAPACITY {
            errors.push(
                "max_capacity",
                format!("cannot exceed {MAX_EVENT_CAPACITY}"),
            );
        }

        if self.start_time <= now {
            errors.push("start_time", "must be in the future");
        }
        if self.start_time >= self.end_time {
            errors.push("end_time", "must be after start_time");
        } else if self.end_time - self.start_time > Duration::days(MAX_EVENT_DURATION_DAYS) {
            errors.push(
                "end_time",
                format!("event cannot last longer than {MAX_EVENT_DURATION_DAYS} days"),
            );
        }

        errors.into_result()?;

        Ok(Event {
            id: EventId::new(),
            name,
            location,
            start_time: self.start_time,
            end_time: self.end_time,
            max_capacity: self.max_capacity,
            created_at: now,
            updated_at: now,
        })
    }
}

/// An event together with its attendee count as read from the store.
///
/// Derived figures are computed from the count captured at read time; they
/// are for display only and never feed the admission decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSnapshot {
    /// The stored event.
    pub event: Event,
    /// Number of attendees registered when the snapshot was taken.
    pub attendee_count: u32,
}

impl EventSnapshot {
    /// Remaining capacity, `max_capacity - attendee_count`.
    #[must_use]
    pub const fn available_slots(&self) -> u32 {
        self.event.max_capacity.saturating_sub(self.attendee_count)
    }

    /// Returns `true` once the count has reached capacity.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.attendee_count >= self.event.max_capacity
    }
}
