//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use chrono_tz::Tz;

use crate::config::AppConfig;
use crate::persistence::EventStore;
use crate::service::{EventQueryService, EventService, RegistrationService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event creation.
    pub events: Arc<EventService>,
    /// Read-only event and attendee queries.
    pub queries: Arc<EventQueryService>,
    /// Attendee registration.
    pub registrations: Arc<RegistrationService>,
    /// Zone used by the display-time endpoint when none is requested.
    pub display_timezone: Tz,
}

impl AppState {
    /// Wires every service to the same `store`.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>, config: &AppConfig) -> Self {
        Self {
            events: Arc::new(EventService::new(Arc::clone(&store))),
            queries: Arc::new(EventQueryService::new(
                Arc::clone(&store),
                config.default_page_size,
                config.max_page_size,
            )),
            registrations: Arc::new(RegistrationService::new(store)),
            display_timezone: config.display_timezone,
        }
    }
}
