//! Registration and attendee list DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common_dto::PaginationMeta;
use crate::domain::{Attendee, AttendeeId, NewAttendee};

/// Request body for `POST /events/:id/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAttendeeRequest {
    /// Attendee name (max 100 chars).
    pub name: String,
    /// Email address, unique per event.
    pub email: String,
}

impl From<RegisterAttendeeRequest> for NewAttendee {
    fn from(req: RegisterAttendeeRequest) -> Self {
        Self::new(req.name, req.email)
    }
}

/// Attendee representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeDto {
    /// Attendee identifier.
    pub id: AttendeeId,
    /// Attendee name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
}

impl From<Attendee> for AttendeeDto {
    fn from(a: Attendee) -> Self {
        Self {
            id: a.id,
            name: a.name,
            email: a.email,
            registered_at: a.registered_at,
        }
    }
}

/// Response body for `POST /events/:id/register` (201 Created).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationResponse {
    /// Confirmation message.
    pub message: String,
    /// The created registration.
    pub attendee: AttendeeDto,
}

/// Paginated list response for `GET /events/:id/attendees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendeeListResponse {
    /// Attendees on this page, in registration order.
    pub attendees: Vec<AttendeeDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
