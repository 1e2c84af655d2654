// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ports::StorageError;
use fixflow_domain::{DomainError, TechnicianId};
use time::{Date, Time};

/// Errors surfaced by the core engines.
///
/// `ConcurrencyConflict` is the only class callers are expected to retry,
/// and only with a fresh re-read; everything else is reported upward
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    Domain(DomainError),
    /// The daily sequence limit was reached. Terminal for that date.
    CapacityExceeded {
        /// The date whose counter is exhausted.
        date: Date,
        /// The per-day limit.
        limit: u16,
    },
    /// The candidate interval overlaps an existing committed reservation.
    /// Callers should offer alternate slots, not retry the same input.
    SchedulingConflict {
        /// The technician whose schedule conflicts.
        technician_id: TechnicianId,
        /// The day of the conflict.
        date: Date,
        /// The rejected candidate's start time.
        start: Time,
        /// The rejected candidate's end time.
        end: Time,
    },
    /// An optimistic-lock check failed. Safe to retry the whole operation
    /// with fresh state.
    ConcurrencyConflict {
        /// The contested resource.
        resource: String,
    },
    /// A referenced record does not exist.
    NotFound {
        /// The missing resource.
        resource: String,
    },
    /// The backing store failed.
    Storage(String),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Domain(err) => write!(f, "Domain violation: {err}"),
            Self::CapacityExceeded { date, limit } => {
                write!(f, "Daily sequence limit of {limit} reached for {date}")
            }
            Self::SchedulingConflict {
                technician_id,
                date,
                start,
                end,
            } => {
                write!(
                    f,
                    "Technician {technician_id} already has a reservation overlapping [{start}, {end}) on {date}"
                )
            }
            Self::ConcurrencyConflict { resource } => {
                write!(f, "Concurrent update lost on {resource}; retry with fresh state")
            }
            Self::NotFound { resource } => write!(f, "Not found: {resource}"),
            Self::Storage(msg) => write!(f, "Storage failure: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict {
                technician_id,
                date,
                start,
                end,
            } => Self::SchedulingConflict {
                technician_id,
                date,
                start,
                end,
            },
            StorageError::VersionConflict { resource } => Self::ConcurrencyConflict { resource },
            StorageError::NotFound(resource) => Self::NotFound { resource },
            StorageError::Backend(msg) => Self::Storage(msg),
        }
    }
}
