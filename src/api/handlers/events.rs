//! Event handlers: create, list upcoming, get, display-time conversion.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono_tz::Tz;

use super::{EventPath, event_id_from_path};
use crate::api::dto::{
    CreateEventRequest, EventListItem, EventResponse, EventTimezoneResponse, TimezoneParams,
};
use crate::app_state::AppState;
use crate::error::ServiceError;

/// `POST /events`: Create a new event.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidEventData`] on validation failure and
/// [`ServiceError::InvalidRequest`] on a malformed body.
pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(req) = payload.map_err(|e| ServiceError::InvalidRequest(e.body_text()))?;
    let created = state.events.create_event(req.into()).await?;
    Ok((StatusCode::CREATED, Json(EventResponse::from(&created))))
}

/// `GET /events`: Events that have not started yet, soonest first.
///
/// # Errors
///
/// Returns [`ServiceError::Storage`] on backend failure.
pub async fn list_upcoming(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let events = state.queries.list_upcoming().await?;
    let items: Vec<EventListItem> = events.iter().map(EventListItem::from).collect();
    Ok(Json(items))
}

/// `GET /events/:id`: Event details with live attendance figures.
///
/// # Errors
///
/// Returns [`ServiceError::EventNotFound`] if the event does not exist.
pub async fn get_event(
    State(state): State<AppState>,
    path: EventPath,
) -> Result<impl IntoResponse, ServiceError> {
    let event_id = event_id_from_path(path)?;
    let snapshot = state.queries.get_event(event_id).await?;
    Ok(Json(EventResponse::from(&snapshot)))
}

/// `GET /events/:id/timezone`: Event details plus start and end rendered
/// in the requested zone (or the configured default).
///
/// # Errors
///
/// Returns [`ServiceError::EventNotFound`] if the event does not exist and
/// [`ServiceError::InvalidRequest`] for an unknown zone name.
pub async fn get_event_in_timezone(
    State(state): State<AppState>,
    path: EventPath,
    params: Result<Query<TimezoneParams>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let event_id = event_id_from_path(path)?;
    let Query(params) = params.map_err(|e| ServiceError::InvalidRequest(e.body_text()))?;
    let snapshot = state.queries.get_event(event_id).await?;

    let tz: Tz = match params.timezone.as_deref() {
        Some(name) => name
            .parse()
            .map_err(|_| ServiceError::InvalidRequest(format!("unknown timezone: {name}")))?,
        None => state.display_timezone,
    };

    Ok(Json(EventTimezoneResponse {
        event: EventResponse::from(&snapshot),
        timezone: tz.name().to_string(),
        local_start_time: snapshot.event.start_time.with_timezone(&tz).to_rfc3339(),
        local_end_time: snapshot.event.end_time.with_timezone(&tz).to_rfc3339(),
    }))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event).get(list_upcoming))
        .route("/events/{id}", get(get_event))
        .route("/events/{id}/timezone", get(get_event_in_timezone))
}
