//! Domain layer: events, attendees, and the invariants they carry.
//!
//! Everything here is pure: no I/O, no locks. Storage and orchestration
//! live in [`crate::persistence`] and [`crate::service`].

pub mod attendee;
pub mod capacity;
pub mod event;
pub mod ids;
pub mod page;
pub mod validation;

pub use attendee::{Attendee, NewAttendee};
pub use capacity::can_admit;
pub use event::{Event, EventSnapshot, NewEvent};
pub use ids::{AttendeeId, EventId};
pub use page::{Page, PageRequest};
pub use validation::{FieldError, ValidationErrors};
