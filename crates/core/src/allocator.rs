// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-day work-order sequence allocation.
//!
//! Sequences within a day are dense and ascending: after k successful
//! allocations the issued numbers are exactly `{1..=k}`, with no gaps and
//! no reuse, even under concurrent contention. The allocator owns the
//! counter; it never derives the next value by scanning issued numbers,
//! which would reintroduce the read-check-write race the counter exists
//! to remove.

use crate::error::CoreError;
use crate::ports::CounterStore;
use fixflow_domain::{MAX_SEQUENCE, WorkOrderNumber};
use std::sync::Arc;
use time::Date;
use tracing::debug;

/// Issues unique, dense per-day sequence numbers.
pub struct SequenceAllocator {
    store: Arc<dyn CounterStore>,
}

impl SequenceAllocator {
    /// Creates an allocator over a counter store.
    #[must_use]
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Allocates the next sequence number for a date.
    ///
    /// Reads the counter, computes the successor, and commits it with a
    /// compare-and-set carrying the observed value as witness. A failed
    /// swap means another allocator advanced the counter, so the loop
    /// re-reads and retries; every failure implies progress toward the
    /// daily limit, so the loop terminates.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::CapacityExceeded` once 999 has been issued for
    /// the date, or a storage error if the counter store fails.
    pub fn allocate(&self, date: Date) -> Result<u16, CoreError> {
        loop {
            let current = self.store.load(date)?;
            let next = current.unwrap_or(0) + 1;
            if next > MAX_SEQUENCE {
                return Err(CoreError::CapacityExceeded {
                    date,
                    limit: MAX_SEQUENCE,
                });
            }
            if self.store.compare_and_set(date, current, next)? {
                return Ok(next);
            }
            debug!(%date, observed = ?current, "counter advanced concurrently, retrying");
        }
    }

    /// Allocates the next sequence for a date and formats it as a
    /// work-order number.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::CapacityExceeded` when the date is exhausted,
    /// a domain error if the date's year cannot be encoded, or a storage
    /// error if the counter store fails.
    pub fn allocate_number(&self, date: Date) -> Result<WorkOrderNumber, CoreError> {
        let sequence = self.allocate(date)?;
        Ok(WorkOrderNumber::compose(date, sequence)?)
    }
}
