//! Read-only queries over events and attendees.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{Attendee, EventId, EventSnapshot, Page, PageRequest};
use crate::error::ServiceError;
use crate::persistence::EventStore;

/// Listing and paging of events and attendees.
///
/// Every call reads the store afresh; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct EventQueryService {
    store: Arc<dyn EventStore>,
    default_page_size: u32,
    max_page_size: u32,
}

impl EventQueryService {
    /// Creates a query service over `store` with the given page sizing.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>, default_page_size: u32, max_page_size: u32) -> Self {
        Self {
            store,
            default_page_size,
            max_page_size,
        }
    }

    /// Events starting after the current time, soonest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Storage`] on backend failure.
    pub async fn list_upcoming(&self) -> Result<Vec<EventSnapshot>, ServiceError> {
        Ok(self.store.list_upcoming(Utc::now()).await?)
    }

    /// Whether the store currently answers.
    pub async fn storage_ready(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "store health check failed");
                false
            }
        }
    }

    /// Loads one event with its current attendee count.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`] if the event does not exist.
    pub async fn get_event(&self, event_id: EventId) -> Result<EventSnapshot, ServiceError> {
        self.store
            .get_event(event_id)
            .await?
            .ok_or(ServiceError::EventNotFound(event_id))
    }

    /// Builds a page request from optional client values using this
    /// service's defaults and cap.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidInput`] if either value is zero.
    pub fn page_request(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<PageRequest, ServiceError> {
        PageRequest::new(page, page_size, self.default_page_size, self.max_page_size)
            .map_err(ServiceError::InvalidInput)
    }

    /// One page of an event's attendees in registration order.
    ///
    /// Pages past the end come back with no items.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`] if the event does not exist.
    pub async fn list_attendees(
        &self,
        event_id: EventId,
        request: PageRequest,
    ) -> Result<Page<Attendee>, ServiceError> {
        let slice = self
            .store
            .attendee_page(event_id, request.offset(), request.page_size())
            .await?
            .ok_or(ServiceError::EventNotFound(event_id))?;

        Ok(Page::new(slice.items, slice.total_count, request))
    }
}
