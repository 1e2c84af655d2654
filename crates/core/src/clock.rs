// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Injectable time source.
//!
//! Every engine that stamps timestamps or derives "today" takes a
//! [`Clock`] at construction, so tests and replays control time.

use std::sync::{Mutex, PoisonError};
use time::{Date, Duration, OffsetDateTime};

/// Supplies the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now_utc(&self) -> OffsetDateTime;

    /// Returns the current UTC calendar date.
    fn today(&self) -> Date {
        self.now_utc().date()
    }
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A settable clock for deterministic tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<OffsetDateTime>,
}

impl FixedClock {
    /// Creates a clock frozen at the given instant.
    #[must_use]
    pub const fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to a new instant.
    pub fn set(&self, now: OffsetDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Advances the clock by a duration.
    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
