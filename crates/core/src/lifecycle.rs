// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Work-order lifecycle enforcement.
//!
//! The transition table itself lives on `WorkOrderStatus`; this engine
//! applies it to whole records: stamping, version bumps, and the event a
//! transition produces for the notification collaborator. Transitions are
//! pure record-in/record-out; persisting the result (and serializing
//! concurrent transitions per order) is the calling service's job.

use crate::clock::Clock;
use crate::error::CoreError;
use fixflow_domain::{
    ActorId, CustomerId, DomainError, WorkOrder, WorkOrderId, WorkOrderNumber, WorkOrderStatus,
};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::info;

/// A lifecycle transition event, handed to the notification collaborator.
///
/// The core only produces the event; it never blocks on delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChangeEvent {
    /// The transitioned work order.
    pub work_order_id: WorkOrderId,
    /// Its human-readable number.
    pub number: WorkOrderNumber,
    /// The status before the transition.
    pub previous_status: WorkOrderStatus,
    /// The status after the transition.
    pub new_status: WorkOrderStatus,
    /// The customer to notify.
    pub customer_id: CustomerId,
    /// The actor who performed the transition.
    pub changed_by: ActorId,
    /// When the transition happened.
    pub changed_at: OffsetDateTime,
}

/// The result of a successful transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    /// The updated work order, version bumped, not yet persisted.
    pub order: WorkOrder,
    /// The event describing the transition.
    pub event: StatusChangeEvent,
}

/// Validates and applies work-order status transitions.
pub struct LifecycleEngine {
    clock: Arc<dyn Clock>,
}

impl LifecycleEngine {
    /// Creates an engine over a clock.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Applies a status transition to a work order.
    ///
    /// On any transition into Closure the completion timestamp is stamped
    /// exactly once; the lifecycle table guarantees Closure is never
    /// re-entered, so a present `completed_at` is left untouched. The
    /// updated record carries the acting user, a fresh `updated_at`, and
    /// a bumped version for the optimistic save.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` (wrapped) if the edge is
    /// not in the lifecycle table.
    pub fn transition(
        &self,
        order: &WorkOrder,
        new_status: WorkOrderStatus,
        actor: &ActorId,
    ) -> Result<TransitionOutcome, CoreError> {
        order.status.validate_transition(new_status)?;

        let now = self.clock.now_utc();
        let previous_status = order.status;

        let mut updated = order.clone();
        updated.status = new_status;
        updated.updated_at = now;
        updated.updated_by = actor.clone();
        updated.version += 1;
        if new_status == WorkOrderStatus::Closure && updated.completed_at.is_none() {
            updated.completed_at = Some(now);
        }

        info!(
            number = %updated.number,
            from = %previous_status,
            to = %new_status,
            actor = %actor,
            "work order transitioned"
        );

        let event = StatusChangeEvent {
            work_order_id: updated.id,
            number: updated.number.clone(),
            previous_status,
            new_status,
            customer_id: updated.customer_id,
            changed_by: actor.clone(),
            changed_at: now,
        };

        Ok(TransitionOutcome {
            order: updated,
            event,
        })
    }
}

/// Checks the deletion policy: work orders may only be deleted while
/// still in Triage.
///
/// # Errors
///
/// Returns `DomainError::InvalidState` (wrapped) for any other status.
pub fn ensure_deletable(order: &WorkOrder) -> Result<(), CoreError> {
    if order.status.permits_deletion() {
        Ok(())
    } else {
        Err(DomainError::InvalidState {
            operation: String::from("delete"),
            status: order.status.as_str().to_string(),
        }
        .into())
    }
}
