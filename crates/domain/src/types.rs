// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Core domain records and their status lifecycles.
//!
//! Statuses are closed enums with explicit transition tables. Transition
//! validation lives here; stamping and persistence belong to the engines
//! that call it.

use crate::error::DomainError;
use crate::interval::TimeInterval;
use crate::number::WorkOrderNumber;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, OffsetDateTime};

macro_rules! numeric_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier value.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier value.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Opaque internal identifier of a work order, assigned by the store.
    WorkOrderId
);
numeric_id!(
    /// Identifier of a technician.
    TechnicianId
);
numeric_id!(
    /// Identifier of the customer owning a device.
    CustomerId
);
numeric_id!(
    /// Identifier of a serviced hardware unit.
    DeviceId
);
numeric_id!(
    /// Identifier of a schedule entry, assigned by the store.
    ScheduleEntryId
);

/// The user or system principal performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(String);

impl ActorId {
    /// Wraps an actor identifier.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Work-order priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Routine work, no committed turnaround.
    Low,
    /// Standard turnaround.
    Medium,
    /// Expedited turnaround.
    High,
    /// Device is out of service; work jumps the queue.
    Urgent,
}

impl Priority {
    /// Returns the string representation of the priority.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(DomainError::InvalidPriority(s.to_string())),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Work-order lifecycle status.
///
/// The main flow is Triage → Quotation → Execution → Qa → Closure, with a
/// rework edge Qa → Execution. Warranty handling is reachable only from
/// Closure and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    /// Initial intake and diagnosis.
    Triage,
    /// Cost estimate awaiting customer approval.
    Quotation,
    /// Repair work in progress.
    Execution,
    /// Quality assurance check.
    Qa,
    /// Repair complete and handed back.
    Closure,
    /// Post-completion warranty handling.
    Warranty,
}

impl WorkOrderStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Triage => "triage",
            Self::Quotation => "quotation",
            Self::Execution => "execution",
            Self::Qa => "qa",
            Self::Closure => "closure",
            Self::Warranty => "warranty",
        }
    }

    /// Returns true if this status has no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Warranty)
    }

    /// Returns true if this status is Closure or a status reached after
    /// Closure. A work order in a completed stage carries a completion
    /// timestamp.
    #[must_use]
    pub const fn is_completed_stage(&self) -> bool {
        matches!(self, Self::Closure | Self::Warranty)
    }

    /// Returns true if work orders in this status may be deleted.
    ///
    /// Deletion is only permitted before the order leaves intake.
    #[must_use]
    pub const fn permits_deletion(&self) -> bool {
        matches!(self, Self::Triage)
    }

    /// Checks if a transition from this status to another is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Triage, Self::Quotation)
                | (Self::Quotation, Self::Execution)
                | (Self::Execution, Self::Qa)
                | (Self::Qa, Self::Closure)
                | (Self::Qa, Self::Execution)
                | (Self::Closure, Self::Warranty)
        )
    }

    /// Validates a transition from this status to another.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the edge is not in the
    /// lifecycle table.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
            })
        }
    }
}

impl FromStr for WorkOrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "triage" => Ok(Self::Triage),
            "quotation" => Ok(Self::Quotation),
            "execution" => Ok(Self::Execution),
            "qa" => Ok(Self::Qa),
            "closure" => Ok(Self::Closure),
            "warranty" => Ok(Self::Warranty),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Schedule-entry status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleEntryStatus {
    /// Committed reservation, work not yet started.
    Scheduled,
    /// Technician is on the job.
    InProgress,
    /// Work finished. Terminal.
    Completed,
    /// Reservation released. Terminal.
    Cancelled,
}

impl ScheduleEntryStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if entries in this status occupy the technician's
    /// time. Only blocking entries participate in conflict checks.
    #[must_use]
    pub const fn blocks_time(&self) -> bool {
        matches!(self, Self::Scheduled | Self::InProgress)
    }

    /// Returns true if this status is terminal (no further mutation).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Checks if a transition from this status to another is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Scheduled, Self::InProgress)
                | (Self::Scheduled, Self::Cancelled)
                | (Self::InProgress, Self::Completed)
                | (Self::InProgress, Self::Cancelled)
        )
    }

    /// Validates a transition from this status to another.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the edge is not
    /// permitted; terminal entries reject every transition.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
            })
        }
    }
}

impl FromStr for ScheduleEntryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidScheduleStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for ScheduleEntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A repair job tracked through its lifecycle.
///
/// Invariants: `completed_at.is_some()` iff `status.is_completed_stage()`;
/// `number` is immutable once assigned and globally unique; `version` is
/// the optimistic-lock token checked on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    /// Opaque internal identifier.
    pub id: WorkOrderId,
    /// Human-readable `YYMMDDSSS` number.
    pub number: WorkOrderNumber,
    /// Current lifecycle status.
    pub status: WorkOrderStatus,
    /// Priority classification.
    pub priority: Priority,
    /// The customer the device belongs to.
    pub customer_id: CustomerId,
    /// The serviced hardware unit.
    pub device_id: DeviceId,
    /// The assigned technician, if any.
    pub technician_id: Option<TechnicianId>,
    /// Creation timestamp (UTC).
    pub created_at: OffsetDateTime,
    /// Timestamp of the last mutation (UTC).
    pub updated_at: OffsetDateTime,
    /// The actor who performed the last mutation.
    pub updated_by: ActorId,
    /// Set exactly once, on the transition into Closure.
    pub completed_at: Option<OffsetDateTime>,
    /// Estimated repair cost.
    pub estimated_cost: f64,
    /// Actual repair cost, recorded during or after execution.
    pub actual_cost: Option<f64>,
    /// Optimistic-lock version, bumped on every mutation.
    pub version: u32,
}

impl WorkOrder {
    /// Returns true if this order has completed its repair (reached
    /// Closure, possibly moving on to Warranty).
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// A committed technician time reservation tied to a work order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Identifier assigned by the store.
    pub id: ScheduleEntryId,
    /// The work order this reservation serves.
    pub work_order_id: WorkOrderId,
    /// The reserved technician.
    pub technician_id: TechnicianId,
    /// The day of the reservation.
    pub date: Date,
    /// The reserved half-open time window.
    pub interval: TimeInterval,
    /// Current reservation status.
    pub status: ScheduleEntryStatus,
}

impl ScheduleEntry {
    /// Returns true if this entry occupies the technician's time.
    #[must_use]
    pub const fn blocks_time(&self) -> bool {
        self.status.blocks_time()
    }
}

/// A recorded slice of technician work, used as aggregation input only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeLogEntry {
    /// The technician who logged the time.
    pub technician_id: TechnicianId,
    /// The work order the time was spent on.
    pub work_order_id: WorkOrderId,
    /// Free-form activity label (diagnosis, repair, testing, ...).
    pub activity: String,
    /// When the activity started (UTC).
    pub started_at: OffsetDateTime,
    /// When the activity ended, if it has.
    pub ended_at: Option<OffsetDateTime>,
    /// Recorded duration in minutes.
    pub minutes: u32,
    /// Cost attributed to this slice of work.
    pub total_cost: f64,
}
