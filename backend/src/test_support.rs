//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for `cfg(test)` and behind the `test-support` feature.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Deletion, DisplayName, EmailAddress, RoleSet, UserAccount, UserId};

mod memory_store;
mod recording_mailer;

pub use memory_store::InMemoryStore;
pub use recording_mailer::RecordingMailer;

/// Fixed instant used across fixtures.
///
/// # Panics
/// Never; the literal is a valid timestamp.
#[must_use]
pub fn fixture_timestamp() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0) {
        chrono::LocalResult::Single(at) => at,
        _ => panic!("fixture timestamp is unambiguous"),
    }
}

/// Clock whose time only moves when told to.
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Confirmed account with a random id and no usable password.
#[must_use]
pub fn user_account(email: EmailAddress, display_name: DisplayName, roles: RoleSet) -> UserAccount {
    UserAccount {
        id: UserId::random(),
        email,
        display_name,
        password_hash: String::new(),
        email_confirmed: true,
        confirmation_token_hash: None,
        roles,
        created_at: fixture_timestamp(),
        last_login_at: None,
        deletion: Deletion::live(),
    }
}
