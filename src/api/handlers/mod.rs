//! REST endpoint handlers organized by resource.

pub mod attendees;
pub mod events;
pub mod system;

use axum::Router;
use axum::extract::Path;
use axum::extract::rejection::PathRejection;

use crate::app_state::AppState;
use crate::domain::EventId;
use crate::error::ServiceError;

/// Event id path segment, with the rejection kept so it can be reported
/// in the common error body.
pub type EventPath = Result<Path<uuid::Uuid>, PathRejection>;

/// Unwraps an [`EventPath`].
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] if the segment is not a UUID.
pub fn event_id_from_path(path: EventPath) -> Result<EventId, ServiceError> {
    let Path(id) = path.map_err(|e| ServiceError::InvalidRequest(e.body_text()))?;
    Ok(EventId::from_uuid(id))
}

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(events::routes())
        .merge(attendees::routes())
}
