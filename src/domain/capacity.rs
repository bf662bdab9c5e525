//! Capacity invariant checker.
//!
//! Only ever evaluated inside a registration unit, against a count read
//! under that unit's lock. A count read anywhere else is stale as soon as
//! a concurrent registration commits.

use super::Event;

/// Returns `true` if `event` can accept one more attendee when
/// `current_count` attendees are already registered.
#[must_use]
pub const fn can_admit(event: &Event, current_count: u32) -> bool {
    current_count < event.max_capacity
}
