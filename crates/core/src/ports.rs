// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborator interfaces consumed by the engines.
//!
//! The core never names a backend. A relational store, the in-memory
//! reference backend, or a test double all implement these traits; the
//! engines receive them as `Arc<dyn ...>` at construction.

use crate::lifecycle::StatusChangeEvent;
use fixflow_domain::{
    ActorId, CustomerId, DeviceId, Priority, ScheduleEntry, ScheduleEntryId, TechnicianId,
    TimeInterval, TimeLogEntry, WorkOrder, WorkOrderId, WorkOrderNumber,
};
use time::{Date, OffsetDateTime, Time};

/// Errors reported by store implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// An insert would overlap an existing committed reservation. The
    /// store detects this inside its own serialization scope, closing the
    /// window between a caller's conflict check and its insert.
    Conflict {
        /// The technician whose schedule conflicts.
        technician_id: TechnicianId,
        /// The day of the conflict.
        date: Date,
        /// The rejected candidate's start time.
        start: Time,
        /// The rejected candidate's end time.
        end: Time,
    },
    /// A versioned save observed a stale version.
    VersionConflict {
        /// The contested resource.
        resource: String,
    },
    /// The requested record does not exist.
    NotFound(String),
    /// The backend failed.
    Backend(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict {
                technician_id,
                date,
                start,
                end,
            } => {
                write!(
                    f,
                    "Insert for technician {technician_id} on {date} overlaps [{start}, {end})"
                )
            }
            Self::VersionConflict { resource } => {
                write!(f, "Stale version on {resource}")
            }
            Self::NotFound(resource) => write!(f, "Not found: {resource}"),
            Self::Backend(msg) => write!(f, "Backend error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Per-date sequence counter with compare-and-set semantics.
///
/// `None` means no sequence has been issued for the date yet. The
/// allocator's correctness rests on `compare_and_set` being atomic
/// relative to all other callers for the same date; different dates must
/// not contend with each other.
pub trait CounterStore: Send + Sync {
    /// Loads the highest sequence issued for a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn load(&self, date: Date) -> Result<Option<u16>, StorageError>;

    /// Atomically replaces the counter for `date` with `next` iff its
    /// current value still equals `expected`. Returns whether the swap
    /// happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn compare_and_set(
        &self,
        date: Date,
        expected: Option<u16>,
        next: u16,
    ) -> Result<bool, StorageError>;
}

/// A reservation to be committed. The store assigns the identifier and
/// the initial Scheduled status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduleRecord {
    /// The work order the reservation serves.
    pub work_order_id: WorkOrderId,
    /// The reserved technician.
    pub technician_id: TechnicianId,
    /// The day of the reservation.
    pub date: Date,
    /// The reserved half-open time window.
    pub interval: TimeInterval,
}

/// Technician schedule persistence.
pub trait ScheduleStore: Send + Sync {
    /// Loads the intervals of a technician's time-blocking entries
    /// (Scheduled, `InProgress`) for a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn blocking_intervals(
        &self,
        technician_id: TechnicianId,
        date: Date,
    ) -> Result<Vec<TimeInterval>, StorageError>;

    /// Commits a reservation. Implementations must re-verify overlap
    /// against blocking entries inside the same serialization scope as
    /// the insert and report `StorageError::Conflict` on overlap.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the reservation overlaps, or
    /// another error if the backend fails.
    fn insert(&self, record: NewScheduleRecord) -> Result<ScheduleEntry, StorageError>;

    /// Loads a schedule entry by identifier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the entry does not exist.
    fn load_entry(&self, id: ScheduleEntryId) -> Result<ScheduleEntry, StorageError>;

    /// Persists a mutated schedule entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the entry does not exist.
    fn update(&self, entry: &ScheduleEntry) -> Result<(), StorageError>;
}

/// A work order to be created. The store assigns the identifier, the
/// initial Triage status, and version 1.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkOrderRecord {
    /// The allocated human-readable number.
    pub number: WorkOrderNumber,
    /// Priority classification.
    pub priority: Priority,
    /// The owning customer.
    pub customer_id: CustomerId,
    /// The serviced hardware unit.
    pub device_id: DeviceId,
    /// Estimated repair cost.
    pub estimated_cost: f64,
    /// Creation timestamp.
    pub created_at: OffsetDateTime,
    /// The actor creating the order.
    pub created_by: ActorId,
}

/// Work-order persistence with optimistic locking.
pub trait WorkOrderStore: Send + Sync {
    /// Persists a new work order and returns it with its assigned
    /// identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the number is already
    /// taken.
    fn insert(&self, record: NewWorkOrderRecord) -> Result<WorkOrder, StorageError>;

    /// Loads a work order by identifier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the order does not exist.
    fn load(&self, id: WorkOrderId) -> Result<WorkOrder, StorageError>;

    /// Persists a mutated work order iff the stored version still equals
    /// `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::VersionConflict` if another writer got
    /// there first, or `StorageError::NotFound` if the order is gone.
    fn save(&self, order: &WorkOrder, expected_version: u32) -> Result<(), StorageError>;

    /// Removes a work order. The caller is responsible for the
    /// Triage-only deletion policy.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the order does not exist.
    fn delete(&self, id: WorkOrderId) -> Result<(), StorageError>;
}

/// Filter for reporting queries. Empty fields match everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkOrderFilter {
    /// Restrict to a technician's orders.
    pub technician_id: Option<TechnicianId>,
    /// Restrict to a customer's orders.
    pub customer_id: Option<CustomerId>,
    /// Keep orders created at or after this instant.
    pub created_from: Option<OffsetDateTime>,
    /// Keep orders created before this instant.
    pub created_to: Option<OffsetDateTime>,
}

/// Read-only access to historical records for aggregation.
pub trait ReportingStore: Send + Sync {
    /// Loads a consistent snapshot of work orders matching the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn work_orders(&self, filter: &WorkOrderFilter) -> Result<Vec<WorkOrder>, StorageError>;

    /// Loads a technician's time logs started within `[from, to)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn time_logs(
        &self,
        technician_id: TechnicianId,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<TimeLogEntry>, StorageError>;
}

/// Receives lifecycle transition events.
///
/// The core emits and moves on; delivery mechanics, retries, and channel
/// choice belong entirely to the implementation.
pub trait NotificationSink: Send + Sync {
    /// Publishes a status-change event.
    fn publish(&self, event: StatusChangeEvent);
}
