//! Registration service: capacity-safe, duplicate-free attendee sign-up.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{Attendee, EventId, NewAttendee, can_admit};
use crate::error::ServiceError;
use crate::persistence::{EventStore, StoreError};

/// Registers attendees under the capacity and unique-email invariants.
///
/// Stateless coordinator over an [`EventStore`]. Every registration runs
/// as one registration unit: open (locks the event) → count → capacity
/// check → duplicate check → insert → commit. Any early return drops the
/// unit, which discards its writes.
#[derive(Debug, Clone)]
pub struct RegistrationService {
    store: Arc<dyn EventStore>,
}

impl RegistrationService {
    /// Creates a new `RegistrationService` over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Registers one attendee for `event_id`.
    ///
    /// Name and email syntax are checked before the unit opens. Capacity
    /// and duplicate checks always run inside it, against counts read
    /// under the event's lock. When two calls race for the last slot, the
    /// one that commits first wins and the other sees the updated count.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidInput`] for a blank name or bad email.
    /// - [`ServiceError::EventNotFound`] if the event does not exist.
    /// - [`ServiceError::EventCapacityExceeded`] if no slot is left.
    /// - [`ServiceError::DuplicateRegistration`] if the email is taken.
    /// - [`ServiceError::RegistrationFailed`] on storage failure; nothing
    ///   was committed.
    pub async fn register(
        &self,
        event_id: EventId,
        input: NewAttendee,
    ) -> Result<Attendee, ServiceError> {
        let input = input
            .validate()
            .map_err(ServiceError::InvalidInput)?;

        let mut unit = self
            .store
            .begin_registration(event_id)
            .await
            .map_err(|e| failed(event_id, e))?
            .ok_or(ServiceError::EventNotFound(event_id))?;

        let count = unit.attendee_count().await.map_err(|e| failed(event_id, e))?;
        let max_capacity = unit.event().max_capacity;
        if !can_admit(unit.event(), count) {
            tracing::debug!(%event_id, count, max_capacity, "registration rejected: event full");
            return Err(ServiceError::EventCapacityExceeded {
                event_id,
                max_capacity,
            });
        }

        if unit
            .email_registered(&input.email)
            .await
            .map_err(|e| failed(event_id, e))?
        {
            tracing::debug!(%event_id, "registration rejected: duplicate email");
            return Err(ServiceError::DuplicateRegistration { email: input.email });
        }

        let email = input.email.clone();
        let attendee = match unit
            .insert_attendee(&input.into_attendee(event_id, Utc::now()))
            .await
        {
            Ok(attendee) => attendee,
            Err(StoreError::UniqueViolation(constraint)) => {
                tracing::warn!(%event_id, %constraint, "duplicate caught by store constraint");
                return Err(ServiceError::DuplicateRegistration { email });
            }
            Err(e) => return Err(failed(event_id, e)),
        };

        unit.commit().await.map_err(|e| failed(event_id, e))?;

        tracing::info!(%event_id, attendee_id = %attendee.id, "attendee registered");
        Ok(attendee)
    }
}

fn failed(event_id: EventId, err: StoreError) -> ServiceError {
    tracing::error!(%event_id, error = %err, "registration unit aborted");
    ServiceError::RegistrationFailed(err)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration};

    use super::*;
    use crate::domain::{Event, EventSnapshot, PageRequest};
    use crate::persistence::{AttendeeSlice, MemoryEventStore, RegistrationUnit};

    fn make_event(max_capacity: u32) -> Event {
        let now = Utc::now();
        Event {
            id: EventId::new(),
            name: "Hackathon".to_string(),
            location: "Lab".to_string(),
            start_time: now + Duration::days(2),
            end_time: now + Duration::days(3),
            max_capacity,
            created_at: now,
            updated_at: now,
        }
    }

    async fn make_service(max_capacity: u32) -> (RegistrationService, Arc<dyn EventStore>, Event) {
        let store: Arc<dyn EventStore> = Arc::new(MemoryEventStore::new());
        let event = make_event(max_capacity);
        let Ok(event) = store.insert_event(&event).await else {
            panic!("insert failed");
        };
        (RegistrationService::new(Arc::clone(&store)), store, event)
    }

    async fn all_attendees(store: &Arc<dyn EventStore>, id: EventId) -> Vec<Attendee> {
        let Ok(Some(slice)) = store.attendee_page(id, 0, u32::MAX).await else {
            panic!("event not found");
        };
        slice.items
    }

    #[tokio::test]
    async fn register_returns_stored_attendee() {
        let (service, store, event) = make_service(5).await;
        let Ok(attendee) = service
            .register(event.id, NewAttendee::new("Alice", "alice@example.com"))
            .await
        else {
            panic!("registration failed");
        };
        assert_eq!(attendee.event_id, event.id);
        assert_eq!(attendee.email, "alice@example.com");
        assert_eq!(all_attendees(&store, event.id).await, vec![attendee]);
    }

    #[tokio::test]
    async fn second_registration_with_same_email_is_duplicate() {
        let (service, store, event) = make_service(5).await;
        let first = service
            .register(event.id, NewAttendee::new("Alice", "alice@example.com"))
            .await;
        assert!(first.is_ok());

        let second = service
            .register(event.id, NewAttendee::new("Alice Again", "alice@example.com"))
            .await;
        assert!(matches!(
            second,
            Err(ServiceError::DuplicateRegistration { .. })
        ));
        assert_eq!(all_attendees(&store, event.id).await.len(), 1);
    }

    #[tokio::test]
    async fn same_email_on_different_events_is_allowed() {
        let (service, store, event) = make_service(5).await;
        let Ok(other) = store.insert_event(&make_event(5)).await else {
            panic!("insert failed");
        };
        for id in [event.id, other.id] {
            let result = service
                .register(id, NewAttendee::new("Alice", "alice@example.com"))
                .await;
            assert!(result.is_ok());
        }
    }

    #[tokio::test]
    async fn unknown_event_is_not_found_without_mutation() {
        let (service, store, event) = make_service(5).await;
        let result = service
            .register(EventId::new(), NewAttendee::new("Bob", "bob@example.com"))
            .await;
        assert!(matches!(result, Err(ServiceError::EventNotFound(_))));
        assert!(all_attendees(&store, event.id).await.is_empty());
    }

    #[tokio::test]
    async fn full_event_rejects_registration() {
        let (service, store, event) = make_service(1).await;
        let first = service
            .register(event.id, NewAttendee::new("Alice", "alice@example.com"))
            .await;
        assert!(first.is_ok());

        let second = service
            .register(event.id, NewAttendee::new("Bob", "bob@example.com"))
            .await;
        assert!(matches!(
            second,
            Err(ServiceError::EventCapacityExceeded { max_capacity: 1, .. })
        ));
        assert_eq!(all_attendees(&store, event.id).await.len(), 1);
    }

    #[tokio::test]
    async fn invalid_input_never_opens_a_unit() {
        let (service, store, event) = make_service(5).await;
        let result = service
            .register(event.id, NewAttendee::new("  ", "not-an-email"))
            .await;
        let Err(ServiceError::InvalidInput(errors)) = result else {
            panic!("expected field errors");
        };
        assert!(errors.has_field("name"));
        assert!(errors.has_field("email"));
        assert!(all_attendees(&store, event.id).await.is_empty());
    }

    #[tokio::test]
    async fn last_slot_race_has_exactly_one_winner() {
        let (service, store, event) = make_service(1).await;

        let a = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .register(event.id, NewAttendee::new("A", "a@example.com"))
                    .await
            })
        };
        let b = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .register(event.id, NewAttendee::new("B", "b@example.com"))
                    .await
            })
        };
        let (Ok(a), Ok(b)) = (a.await, b.await) else {
            panic!("task panicked");
        };

        let outcomes = [a, b];
        let wins = outcomes.iter().filter(|r| r.is_ok()).count();
        let full = outcomes
            .iter()
            .filter(|r| matches!(r, Err(ServiceError::EventCapacityExceeded { .. })))
            .count();
        assert_eq!(wins, 1);
        assert_eq!(full, 1);
        assert_eq!(all_attendees(&store, event.id).await.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_never_exceed_capacity() {
        let capacity = 10;
        let (service, store, event) = make_service(capacity).await;

        let mut handles = Vec::new();
        for i in 0..64 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .register(
                        event.id,
                        NewAttendee::new(format!("User {i}"), format!("user{i}@example.com")),
                    )
                    .await
            }));
        }

        let mut wins = 0;
        for handle in handles {
            match handle.await {
                Ok(Ok(_)) => wins += 1,
                Ok(Err(ServiceError::EventCapacityExceeded { .. })) => {}
                Ok(Err(other)) => panic!("unexpected error: {other}"),
                Err(e) => panic!("task panicked: {e}"),
            }
        }
        assert_eq!(wins, capacity);
        assert_eq!(all_attendees(&store, event.id).await.len(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicates_register_once() {
        let (service, store, event) = make_service(50).await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .register(event.id, NewAttendee::new("Alice", "alice@example.com"))
                    .await
            }));
        }
        let mut wins = 0;
        for handle in handles {
            match handle.await {
                Ok(Ok(_)) => wins += 1,
                Ok(Err(ServiceError::DuplicateRegistration { .. })) => {}
                Ok(Err(other)) => panic!("unexpected error: {other}"),
                Err(e) => panic!("task panicked: {e}"),
            }
        }
        assert_eq!(wins, 1);

        let attendees = all_attendees(&store, event.id).await;
        let emails: HashSet<_> = attendees.iter().map(|a| a.email.as_str()).collect();
        assert_eq!(emails.len(), attendees.len());
    }

    /// Which step of the unit should misbehave.
    #[derive(Debug, Clone, Copy)]
    enum FailAt {
        Insert,
        Commit,
        /// `email_registered` always answers `false`.
        EmailCheck,
    }

    /// Store that delegates to a [`MemoryEventStore`] but injects a fault
    /// into every registration unit.
    #[derive(Debug)]
    struct FailingStore {
        inner: MemoryEventStore,
        fail_at: FailAt,
    }

    #[derive(Debug)]
    struct FailingUnit {
        inner: Box<dyn RegistrationUnit>,
        fail_at: FailAt,
    }

    #[async_trait]
    impl EventStore for FailingStore {
        async fn insert_event(&self, event: &Event) -> Result<Event, StoreError> {
            self.inner.insert_event(event).await
        }

        async fn get_event(&self, id: EventId) -> Result<Option<EventSnapshot>, StoreError> {
            self.inner.get_event(id).await
        }

        async fn list_upcoming(
            &self,
            after: DateTime<Utc>,
        ) -> Result<Vec<EventSnapshot>, StoreError> {
            self.inner.list_upcoming(after).await
        }

        async fn attendee_page(
            &self,
            event_id: EventId,
            offset: u64,
            limit: u32,
        ) -> Result<Option<AttendeeSlice>, StoreError> {
            self.inner.attendee_page(event_id, offset, limit).await
        }

        async fn delete_event(&self, id: EventId) -> Result<bool, StoreError> {
            self.inner.delete_event(id).await
        }

        async fn begin_registration(
            &self,
            event_id: EventId,
        ) -> Result<Option<Box<dyn RegistrationUnit>>, StoreError> {
            let unit = self.inner.begin_registration(event_id).await?;
            Ok(unit.map(|inner| {
                Box::new(FailingUnit {
                    inner,
                    fail_at: self.fail_at,
                }) as Box<dyn RegistrationUnit>
            }))
        }
    }

    #[async_trait]
    impl RegistrationUnit for FailingUnit {
        fn event(&self) -> &Event {
            self.inner.event()
        }

        async fn attendee_count(&mut self) -> Result<u32, StoreError> {
            self.inner.attendee_count().await
        }

        async fn email_registered(&mut self, email: &str) -> Result<bool, StoreError> {
            if matches!(self.fail_at, FailAt::EmailCheck) {
                return Ok(false);
            }
            self.inner.email_registered(email).await
        }

        async fn insert_attendee(&mut self, attendee: &Attendee) -> Result<Attendee, StoreError> {
            if matches!(self.fail_at, FailAt::Insert) {
                return Err(StoreError::Unavailable("injected insert failure".to_string()));
            }
            self.inner.insert_attendee(attendee).await
        }

        async fn commit(self: Box<Self>) -> Result<(), StoreError> {
            if matches!(self.fail_at, FailAt::Commit) {
                return Err(StoreError::Unavailable("injected commit failure".to_string()));
            }
            self.inner.commit().await
        }
    }

    async fn assert_failure_leaves_no_attendee(fail_at: FailAt) {
        let store: Arc<dyn EventStore> = Arc::new(FailingStore {
            inner: MemoryEventStore::new(),
            fail_at,
        });
        let Ok(event) = store.insert_event(&make_event(5)).await else {
            panic!("insert failed");
        };
        let service = RegistrationService::new(Arc::clone(&store));

        let result = service
            .register(event.id, NewAttendee::new("Alice", "alice@example.com"))
            .await;
        let Err(err) = result else {
            panic!("expected failure");
        };
        assert!(matches!(err, ServiceError::RegistrationFailed(_)));
        assert!(err.is_retriable());

        let Ok(Some(slice)) = store
            .attendee_page(event.id, 0, PageRequest::default().page_size())
            .await
        else {
            panic!("event not found");
        };
        assert_eq!(slice.total_count, 0);
    }

    #[tokio::test]
    async fn failed_insert_commits_nothing() {
        assert_failure_leaves_no_attendee(FailAt::Insert).await;
    }

    #[tokio::test]
    async fn failed_commit_commits_nothing() {
        assert_failure_leaves_no_attendee(FailAt::Commit).await;
    }

    #[tokio::test]
    async fn failed_unit_releases_event_lock() {
        let store: Arc<dyn EventStore> = Arc::new(FailingStore {
            inner: MemoryEventStore::new(),
            fail_at: FailAt::Commit,
        });
        let Ok(event) = store.insert_event(&make_event(5)).await else {
            panic!("insert failed");
        };
        let service = RegistrationService::new(Arc::clone(&store));
        let _ = service
            .register(event.id, NewAttendee::new("Alice", "alice@example.com"))
            .await;

        let reopened = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            store.begin_registration(event.id),
        )
        .await;
        assert!(matches!(reopened, Ok(Ok(Some(_)))));
    }

    #[tokio::test]
    async fn store_constraint_reports_duplicate_when_check_misses() {
        let store: Arc<dyn EventStore> = Arc::new(FailingStore {
            inner: MemoryEventStore::new(),
            fail_at: FailAt::EmailCheck,
        });
        let Ok(event) = store.insert_event(&make_event(5)).await else {
            panic!("insert failed");
        };
        let service = RegistrationService::new(Arc::clone(&store));

        let first = service
            .register(event.id, NewAttendee::new("Alice", "alice@example.com"))
            .await;
        assert!(first.is_ok());

        let second = service
            .register(event.id, NewAttendee::new("Alice", "alice@example.com"))
            .await;
        let Err(err) = second else {
            panic!("second registration should be rejected");
        };
        assert!(matches!(err, ServiceError::DuplicateRegistration { .. }));
        assert_eq!(err.error_code(), 4002);
        assert!(!err.is_retriable());
        assert_eq!(all_attendees(&store, event.id).await.len(), 1);
    }
}
