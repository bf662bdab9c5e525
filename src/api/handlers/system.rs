//! Liveness and storage readiness.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"healthy"` when the store answers, `"degraded"` otherwise.
    pub status: String,
    /// Whether the event store answered its ping.
    pub storage: bool,
    /// Server time of the check.
    pub timestamp: DateTime<Utc>,
    /// Crate version.
    pub version: String,
}

/// `GET /health`: 200 when storage is reachable, 503 when it is not.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let storage = state.queries.storage_ready().await;
    let (status, label) = if storage {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            storage,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Routes mounted outside `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::config::AppConfig;
    use crate::domain::{Event, EventId, EventSnapshot};
    use crate::persistence::{AttendeeSlice, EventStore, RegistrationUnit, StoreError};

    #[derive(Debug)]
    struct DownStore;

    fn down() -> StoreError {
        StoreError::Unavailable("backend offline".to_string())
    }

    #[async_trait]
    impl EventStore for DownStore {
        async fn insert_event(&self, _: &Event) -> Result<Event, StoreError> {
            Err(down())
        }
        async fn get_event(&self, _: EventId) -> Result<Option<EventSnapshot>, StoreError> {
            Err(down())
        }
        async fn list_upcoming(&self, _: DateTime<Utc>) -> Result<Vec<EventSnapshot>, StoreError> {
            Err(down())
        }
        async fn attendee_page(
            &self,
            _: EventId,
            _: u64,
            _: u32,
        ) -> Result<Option<AttendeeSlice>, StoreError> {
            Err(down())
        }
        async fn delete_event(&self, _: EventId) -> Result<bool, StoreError> {
            Err(down())
        }
        async fn begin_registration(
            &self,
            _: EventId,
        ) -> Result<Option<Box<dyn RegistrationUnit>>, StoreError> {
            Err(down())
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Err(down())
        }
    }

    #[tokio::test]
    async fn unreachable_store_reports_degraded() {
        let state = AppState::new(Arc::new(DownStore), &AppConfig::default());
        let (status, Json(body)) = health_handler(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert!(!body.storage);
    }
}
