//! Attendee handlers: register, paginated list.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::{EventPath, event_id_from_path};
use crate::api::dto::{
    AttendeeDto, AttendeeListResponse, PaginationMeta, PaginationParams, RegisterAttendeeRequest,
    RegistrationResponse,
};
use crate::app_state::AppState;
use crate::error::ServiceError;

/// `POST /events/:id/register`: Register an attendee.
///
/// # Errors
///
/// Returns [`ServiceError::EventNotFound`] (404),
/// [`ServiceError::InvalidInput`] with field details,
/// [`ServiceError::EventCapacityExceeded`] or
/// [`ServiceError::DuplicateRegistration`] (400), and
/// [`ServiceError::RegistrationFailed`] (503) on storage failure.
pub async fn register_attendee(
    State(state): State<AppState>,
    path: EventPath,
    payload: Result<Json<RegisterAttendeeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let event_id = event_id_from_path(path)?;
    let Json(req) = payload.map_err(|e| ServiceError::InvalidRequest(e.body_text()))?;

    let attendee = state.registrations.register(event_id, req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            message: "Registration successful".to_string(),
            attendee: AttendeeDto::from(attendee),
        }),
    ))
}

/// `GET /events/:id/attendees`: Attendees in registration order, paged.
///
/// # Errors
///
/// Returns [`ServiceError::EventNotFound`] if the event does not exist and
/// [`ServiceError::InvalidInput`] for a zero page value, or
/// [`ServiceError::InvalidRequest`] for a non-numeric one.
pub async fn list_attendees(
    State(state): State<AppState>,
    path: EventPath,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let event_id = event_id_from_path(path)?;
    let Query(params) = params.map_err(|e| ServiceError::InvalidRequest(e.body_text()))?;
    let request = state.queries.page_request(params.page, params.page_size)?;

    let page = state.queries.list_attendees(event_id, request).await?;
    let pagination = PaginationMeta::from(&page);

    Ok(Json(AttendeeListResponse {
        attendees: page.items.into_iter().map(AttendeeDto::from).collect(),
        pagination,
    }))
}

/// Attendee routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events/{id}/register", post(register_attendee))
        .route("/events/{id}/attendees", get(list_attendees))
}
