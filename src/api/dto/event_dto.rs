//! Event DTOs for create, get, list, and display-time operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EventId, EventSnapshot, NewEvent};

/// Request body for `POST /events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    /// Event name (max 200 chars).
    pub name: String,
    /// Venue or address (max 300 chars).
    pub location: String,
    /// Start time (RFC 3339).
    pub start_time: DateTime<Utc>,
    /// End time (RFC 3339).
    pub end_time: DateTime<Utc>,
    /// Maximum number of attendees.
    pub max_capacity: u32,
}

impl From<CreateEventRequest> for NewEvent {
    fn from(req: CreateEventRequest) -> Self {
        Self {
            name: req.name,
            location: req.location,
            start_time: req.start_time,
            end_time: req.end_time,
            max_capacity: req.max_capacity,
        }
    }
}

/// Full event representation for `POST /events` and `GET /events/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResponse {
    /// Event identifier.
    pub id: EventId,
    /// Event name.
    pub name: String,
    /// Venue or address.
    pub location: String,
    /// Start time.
    pub start_time: DateTime<Utc>,
    /// End time.
    pub end_time: DateTime<Utc>,
    /// Maximum number of attendees.
    pub max_capacity: u32,
    /// Attendees registered when the event was read.
    pub attendee_count: u32,
    /// `max_capacity - attendee_count`.
    pub available_slots: u32,
    /// Whether the event has reached capacity.
    pub is_full: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&EventSnapshot> for EventResponse {
    fn from(s: &EventSnapshot) -> Self {
        Self {
            id: s.event.id,
            name: s.event.name.clone(),
            location: s.event.location.clone(),
            start_time: s.event.start_time,
            end_time: s.event.end_time,
            max_capacity: s.event.max_capacity,
            attendee_count: s.attendee_count,
            available_slots: s.available_slots(),
            is_full: s.is_full(),
            created_at: s.event.created_at,
            updated_at: s.event.updated_at,
        }
    }
}

/// Event summary for `GET /events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListItem {
    /// Event identifier.
    pub id: EventId,
    /// Event name.
    pub name: String,
    /// Venue or address.
    pub location: String,
    /// Start time.
    pub start_time: DateTime<Utc>,
    /// End time.
    pub end_time: DateTime<Utc>,
    /// Maximum number of attendees.
    pub max_capacity: u32,
    /// Attendees registered when the list was read.
    pub attendee_count: u32,
    /// `max_capacity - attendee_count`.
    pub available_slots: u32,
}

impl From<&EventSnapshot> for EventListItem {
    fn from(s: &EventSnapshot) -> Self {
        Self {
            id: s.event.id,
            name: s.event.name.clone(),
            location: s.event.location.clone(),
            start_time: s.event.start_time,
            end_time: s.event.end_time,
            max_capacity: s.event.max_capacity,
            attendee_count: s.attendee_count,
            available_slots: s.available_slots(),
        }
    }
}

/// Query parameters for `GET /events/:id/timezone`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimezoneParams {
    /// IANA zone name, e.g. `"Europe/Berlin"`.
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Event representation plus start and end rendered in a display zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTimezoneResponse {
    /// The event in UTC.
    #[serde(flatten)]
    pub event: EventResponse,
    /// Zone the local times are rendered in.
    pub timezone: String,
    /// `start_time` in `timezone` (RFC 3339 with offset).
    pub local_start_time: String,
    /// `end_time` in `timezone` (RFC 3339 with offset).
    pub local_end_time: String,
}
