//! In-memory event store with per-event fine-grained locking.
//!
//! [`MemoryEventStore`] keeps every event in a `HashMap` where each entry
//! is individually protected by a [`tokio::sync::Mutex`]. A registration
//! unit holds its event's mutex from open to commit, so units on the same
//! event are serialized while units on different events run concurrently.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::{AttendeeSlice, EventStore, RegistrationUnit, StoreError};
use crate::domain::{Attendee, Event, EventId, EventSnapshot};

const EVENT_KEY: &str = "events_pkey";
const EVENT_EMAIL_KEY: &str = "attendees_event_id_email_key";

/// One event and the attendees it owns.
#[derive(Debug)]
struct EventSlot {
    event: Event,
    attendees: Vec<Attendee>,
    emails: HashSet<String>,
    /// Set once the slot has been removed from the map; late lockers must
    /// treat the event as gone.
    deleted: bool,
}

impl EventSlot {
    fn snapshot(&self) -> EventSnapshot {
        EventSnapshot {
            event: self.event.clone(),
            attendee_count: count_u32(self.attendees.len()),
        }
    }
}

/// Process-local [`EventStore`].
///
/// Uses a `RwLock<HashMap<...>>` for the outer map and a per-event
/// `Arc<Mutex<EventSlot>>` for the registration lock.
///
/// # Concurrency
///
/// - Registrations for the same event are serialized.
/// - Registrations for different events never wait on each other.
/// - Reads take the per-event lock briefly and see only committed state.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<HashMap<EventId, Arc<Mutex<EventSlot>>>>,
}

impl MemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, id: EventId) -> Option<Arc<Mutex<EventSlot>>> {
        self.events.read().await.get(&id).map(Arc::clone)
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert_event(&self, event: &Event) -> Result<Event, StoreError> {
        let mut map = self.events.write().await;
        if map.contains_key(&event.id) {
            return Err(StoreError::UniqueViolation(EVENT_KEY.to_string()));
        }
        map.insert(
            event.id,
            Arc::new(Mutex::new(EventSlot {
                event: event.clone(),
                attendees: Vec::new(),
                emails: HashSet::new(),
                deleted: false,
            })),
        );
        Ok(event.clone())
    }

    async fn get_event(&self, id: EventId) -> Result<Option<EventSnapshot>, StoreError> {
        let Some(slot) = self.slot(id).await else {
            return Ok(None);
        };
        let slot = slot.lock().await;
        Ok((!slot.deleted).then(|| slot.snapshot()))
    }

    async fn list_upcoming(&self, after: DateTime<Utc>) -> Result<Vec<EventSnapshot>, StoreError> {
        let slots: Vec<_> = self.events.read().await.values().map(Arc::clone).collect();

        let mut upcoming = Vec::new();
        for slot in slots {
            let slot = slot.lock().await;
            if !slot.deleted && slot.event.start_time > after {
                upcoming.push(slot.snapshot());
            }
        }
        upcoming.sort_by(|a, b| {
            (a.event.start_time, a.event.created_at, a.event.id).cmp(&(
                b.event.start_time,
                b.event.created_at,
                b.event.id,
            ))
        });
        Ok(upcoming)
    }

    async fn attendee_page(
        &self,
        event_id: EventId,
        offset: u64,
        limit: u32,
    ) -> Result<Option<AttendeeSlice>, StoreError> {
        let Some(slot) = self.slot(event_id).await else {
            return Ok(None);
        };
        let slot = slot.lock().await;
        if slot.deleted {
            return Ok(None);
        }
        let items = slot
            .attendees
            .iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(Some(AttendeeSlice {
            items,
            total_count: count_u32(slot.attendees.len()),
        }))
    }

    async fn delete_event(&self, id: EventId) -> Result<bool, StoreError> {
        let Some(slot) = self.events.write().await.remove(&id) else {
            return Ok(false);
        };
        // Waits for any open registration unit on this event to finish.
        let mut slot = slot.lock().await;
        slot.deleted = true;
        slot.attendees.clear();
        slot.emails.clear();
        tracing::debug!(event_id = %id, "event and attendees removed");
        Ok(true)
    }

    async fn begin_registration(
        &self,
        event_id: EventId,
    ) -> Result<Option<Box<dyn RegistrationUnit>>, StoreError> {
        let Some(slot) = self.slot(event_id).await else {
            return Ok(None);
        };
        let guard = slot.lock_owned().await;
        if guard.deleted {
            return Ok(None);
        }
        Ok(Some(Box::new(MemoryRegistrationUnit {
            slot: guard,
            staged: Vec::new(),
        })))
    }
}

/// Registration unit over one locked [`EventSlot`].
///
/// Writes are staged and only applied to the slot on commit.
#[derive(Debug)]
struct MemoryRegistrationUnit {
    slot: OwnedMutexGuard<EventSlot>,
    staged: Vec<Attendee>,
}

impl MemoryRegistrationUnit {
    fn contains_email(&self, email: &str) -> bool {
        self.slot.emails.contains(email) || self.staged.iter().any(|a| a.email == email)
    }
}

#[async_trait]
impl RegistrationUnit for MemoryRegistrationUnit {
    fn event(&self) -> &Event {
        &self.slot.event
    }

    async fn attendee_count(&mut self) -> Result<u32, StoreError> {
        Ok(count_u32(self.slot.attendees.len() + self.staged.len()))
    }

    async fn email_registered(&mut self, email: &str) -> Result<bool, StoreError> {
        Ok(self.contains_email(email))
    }

    async fn insert_attendee(&mut self, attendee: &Attendee) -> Result<Attendee, StoreError> {
        if attendee.event_id != self.slot.event.id {
            return Err(StoreError::Corrupt(format!(
                "attendee for event {} staged on event {}",
                attendee.event_id, self.slot.event.id
            )));
        }
        if self.contains_email(&attendee.email) {
            return Err(StoreError::UniqueViolation(EVENT_EMAIL_KEY.to_string()));
        }
        self.staged.push(attendee.clone());
        Ok(attendee.clone())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let Self { mut slot, staged } = *self;
        for attendee in staged {
            slot.emails.insert(attendee.email.clone());
            slot.attendees.push(attendee);
        }
        Ok(())
    }
}

fn count_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
