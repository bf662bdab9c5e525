//! Attendee records and registration input.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::validation::{ValidationErrors, check_text};
use super::{AttendeeId, EventId};

/// Maximum length of an attendee name, in characters.
pub const MAX_ATTENDEE_NAME_LEN: usize = 100;

/// Maximum length of an email address (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

/// Returns `true` if `email` has standard address syntax.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email))
}

/// A registration of one person for one event.
///
/// Owned by its event: it has no lifecycle of its own and is removed
/// together with the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Unique attendee identifier.
    pub id: AttendeeId,
    /// Owning event.
    pub event_id: EventId,
    /// Attendee display name.
    pub name: String,
    /// Email address, unique within the owning event.
    pub email: String,
    /// When the registration committed.
    pub registered_at: DateTime<Utc>,
}

/// Caller-supplied fields for a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendee {
    /// Attendee display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

impl NewAttendee {
    /// Creates registration input from raw strings.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Trims and checks the name and email syntax.
    ///
    /// # Errors
    ///
    /// Returns field-level failures for a blank or over-long name and for
    /// a malformed or over-long email.
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();

        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "name", &name, MAX_ATTENDEE_NAME_LEN);
        if email.chars().count() > MAX_EMAIL_LEN {
            errors.push("email", format!("must be at most {MAX_EMAIL_LEN} characters"));
        } else if !is_valid_email(&email) {
            errors.push("email", "invalid email format");
        }
        errors.into_result()?;

        Ok(Self { name, email })
    }

    /// Builds the attendee record for `event_id`, stamped with `registered_at`.
    #[must_use]
    pub fn into_attendee(self, event_id: EventId, registered_at: DateTime<Utc>) -> Attendee {
        Attendee {
            id: AttendeeId::new(),
            event_id,
            name: self.name,
            email: self.email,
            registered_at,
        }
    }
}
