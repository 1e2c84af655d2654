// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Technician scheduling: conflict detection, availability planning, and
//! the booking service.
//!
//! Conflict detection and slot planning are pure functions over a
//! snapshot of committed intervals. The service layer fetches the
//! snapshot; the store's insert re-verifies inside its own serialization
//! scope, so a booking that raced past the service-level check still
//! cannot double-book a technician.

use crate::error::CoreError;
use crate::ports::{NewScheduleRecord, ScheduleStore, StorageError};
use fixflow_domain::{
    DomainError, ScheduleEntry, ScheduleEntryId, ScheduleEntryStatus, TechnicianId, TimeInterval,
    WorkOrderId,
};
use std::sync::Arc;
use time::{Date, Time};
use time::macros::time;
use tracing::info;

/// Reports whether a candidate interval collides with any committed
/// interval.
///
/// Only time-blocking entries (Scheduled, `InProgress`) belong in
/// `committed`; cancelled and completed reservations never conflict.
#[must_use]
pub fn has_conflict(committed: &[TimeInterval], candidate: &TimeInterval) -> bool {
    committed.iter().any(|existing| existing.overlaps(candidate))
}

/// A working-hours window partitioned into fixed-size slots.
///
/// Shift bounds and slot size are configuration inputs so the planner
/// serves different shift models; the default mirrors the common
/// 08:00-17:00 day with one-hour slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftConfig {
    work_start: Time,
    work_end: Time,
    slot_minutes: u16,
}

impl ShiftConfig {
    /// Creates a shift configuration.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidShift` if the window is empty or
    /// inverted, or if the slot size is zero.
    pub fn new(work_start: Time, work_end: Time, slot_minutes: u16) -> Result<Self, DomainError> {
        if work_start >= work_end {
            return Err(DomainError::InvalidShift {
                reason: format!("window [{work_start}, {work_end}) is empty or inverted"),
            });
        }
        if slot_minutes == 0 {
            return Err(DomainError::InvalidShift {
                reason: String::from("slot size must be positive"),
            });
        }
        Ok(Self {
            work_start,
            work_end,
            slot_minutes,
        })
    }

    /// Returns the shift's start time.
    #[must_use]
    pub const fn work_start(&self) -> Time {
        self.work_start
    }

    /// Returns the shift's exclusive end time.
    #[must_use]
    pub const fn work_end(&self) -> Time {
        self.work_end
    }

    /// Returns the slot size in minutes.
    #[must_use]
    pub const fn slot_minutes(&self) -> u16 {
        self.slot_minutes
    }

    /// Partitions the window into consecutive fixed-size slots, ascending
    /// by start time. A trailing remainder shorter than one slot is not
    /// offered.
    #[must_use]
    pub fn slots(&self) -> Vec<TimeInterval> {
        let start = minutes_since_midnight(self.work_start);
        let end = minutes_since_midnight(self.work_end);
        let step = u32::from(self.slot_minutes);

        let mut slots = Vec::new();
        let mut cursor = start;
        while cursor + step <= end {
            if let (Some(s), Some(e)) = (
                time_from_minutes(cursor),
                time_from_minutes(cursor + step),
            ) {
                if let Ok(slot) = TimeInterval::new(s, e) {
                    slots.push(slot);
                }
            }
            cursor += step;
        }
        slots
    }
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            work_start: time!(8:00),
            work_end: time!(17:00),
            slot_minutes: 60,
        }
    }
}

/// Computes the free fixed-size slots of a shift.
///
/// A slot is offered iff it does not overlap any committed interval.
/// The result is ordered ascending by start time and empty when the
/// technician has no free slot.
#[must_use]
pub fn available_slots(committed: &[TimeInterval], shift: &ShiftConfig) -> Vec<TimeInterval> {
    shift
        .slots()
        .into_iter()
        .filter(|slot| !has_conflict(committed, slot))
        .collect()
}

fn minutes_since_midnight(t: Time) -> u32 {
    u32::from(t.hour()) * 60 + u32::from(t.minute())
}

fn time_from_minutes(total: u32) -> Option<Time> {
    let hour = u8::try_from(total / 60).ok()?;
    let minute = u8::try_from(total % 60).ok()?;
    Time::from_hms(hour, minute, 0).ok()
}

/// Books technicians into time slots and manages reservation lifecycles.
pub struct SchedulingService {
    store: Arc<dyn ScheduleStore>,
}

impl SchedulingService {
    /// Creates a service over a schedule store.
    #[must_use]
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    /// Commits a reservation for a technician.
    ///
    /// The committed-interval snapshot is checked first so callers get a
    /// structured conflict without a write attempt; the store's insert
    /// re-verifies atomically, so two bookers racing past this check
    /// cannot both land.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::SchedulingConflict` if the candidate overlaps
    /// an existing committed reservation, or a storage error if the
    /// backend fails.
    pub fn book(
        &self,
        work_order_id: WorkOrderId,
        technician_id: TechnicianId,
        date: Date,
        interval: TimeInterval,
    ) -> Result<ScheduleEntry, CoreError> {
        let committed = self.store.blocking_intervals(technician_id, date)?;
        if has_conflict(&committed, &interval) {
            return Err(CoreError::SchedulingConflict {
                technician_id,
                date,
                start: interval.start(),
                end: interval.end(),
            });
        }

        let entry = self.store.insert(NewScheduleRecord {
            work_order_id,
            technician_id,
            date,
            interval,
        })?;

        info!(
            entry = %entry.id,
            technician = %technician_id,
            %date,
            slot = %interval,
            "reservation committed"
        );
        Ok(entry)
    }

    /// Computes the free slots of a technician's day under a shift
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend fails.
    pub fn availability(
        &self,
        technician_id: TechnicianId,
        date: Date,
        shift: &ShiftConfig,
    ) -> Result<Vec<TimeInterval>, CoreError> {
        let committed = self.store.blocking_intervals(technician_id, date)?;
        Ok(available_slots(&committed, shift))
    }

    /// Marks a reservation as started.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` (wrapped) if the entry is
    /// not Scheduled, or `CoreError::NotFound` if it does not exist.
    pub fn start(&self, id: ScheduleEntryId) -> Result<ScheduleEntry, CoreError> {
        self.advance(id, ScheduleEntryStatus::InProgress)
    }

    /// Marks a reservation as completed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` (wrapped) if the entry is
    /// not `InProgress`, or `CoreError::NotFound` if it does not exist.
    pub fn complete(&self, id: ScheduleEntryId) -> Result<ScheduleEntry, CoreError> {
        self.advance(id, ScheduleEntryStatus::Completed)
    }

    /// Cancels a reservation, releasing its time window.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` (wrapped) if the entry is
    /// already terminal, or `CoreError::NotFound` if it does not exist.
    pub fn cancel(&self, id: ScheduleEntryId) -> Result<ScheduleEntry, CoreError> {
        self.advance(id, ScheduleEntryStatus::Cancelled)
    }

    fn advance(
        &self,
        id: ScheduleEntryId,
        target: ScheduleEntryStatus,
    ) -> Result<ScheduleEntry, CoreError> {
        let mut entry = self.store.load_entry(id)?;
        entry.status.validate_transition(target)?;
        entry.status = target;
        self.store.update(&entry)?;
        Ok(entry)
    }
}
