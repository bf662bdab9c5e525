//! # event-registrar
//!
//! REST service for creating events and registering attendees.
//!
//! Registration enforces two invariants under any number of concurrent
//! callers: an event never holds more attendees than its capacity, and an
//! email is registered at most once per event. Each registration runs as a
//! single atomic unit that locks only the event it targets.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── RegistrationService / EventQueryService / EventService (service/)
//!     │
//!     ├── Event, Attendee, can_admit (domain/)
//!     │
//!     └── EventStore (persistence/)
//!           ├── MemoryEventStore   (per-event tokio mutex)
//!           └── PostgresEventStore (transaction + SELECT ... FOR UPDATE)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
