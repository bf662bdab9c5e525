//! Service layer: business logic orchestration.
//!
//! [`RegistrationService`] runs the atomic registration unit,
//! [`EventQueryService`] serves reads, and [`EventService`] creates
//! events. Each holds only an explicit store handle.

pub mod event_service;
pub mod query_service;
pub mod registration_service;

pub use event_service::EventService;
pub use query_service::EventQueryService;
pub use registration_service::RegistrationService;
