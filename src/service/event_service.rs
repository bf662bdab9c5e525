//! Event creation.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{EventSnapshot, NewEvent};
use crate::error::ServiceError;
use crate::persistence::EventStore;

/// Validates and stores new events.
#[derive(Debug, Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
}

impl EventService {
    /// Creates a new `EventService` over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Validates every event invariant and stores the event in one write.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidEventData`] with field-level detail
    /// when validation fails (nothing is stored), or
    /// [`ServiceError::Storage`] if the write fails.
    pub async fn create_event(&self, input: NewEvent) -> Result<EventSnapshot, ServiceError> {
        let event = input
            .validate(Utc::now())
            .map_err(ServiceError::InvalidEventData)?;

        let event = self.store.insert_event(&event).await?;
        tracing::info!(event_id = %event.id, name = %event.name, max_capacity = event.max_capacity, "event created");

        Ok(EventSnapshot {
            event,
            attendee_count: 0,
        })
    }
}
