//! Data Transfer Objects for REST request/response serialization.
//!
//! Timestamps travel as RFC 3339 strings in UTC unless a field says
//! otherwise.

pub mod attendee_dto;
pub mod common_dto;
pub mod event_dto;

pub use attendee_dto::*;
pub use common_dto::*;
pub use event_dto::*;
