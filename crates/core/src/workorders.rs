// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Work-order orchestration: creation, status changes, and deletion.
//!
//! Status changes on a single order are serialized through optimistic
//! versioning: the service re-reads and retries a bounded number of times
//! when a save observes a stale version. Concurrency conflicts are the
//! only error class retried here; everything else propagates on first
//! occurrence.

use crate::allocator::SequenceAllocator;
use crate::clock::Clock;
use crate::error::CoreError;
use crate::lifecycle::{LifecycleEngine, ensure_deletable};
use crate::ports::{CounterStore, NewWorkOrderRecord, NotificationSink, StorageError, WorkOrderStore};
use fixflow_domain::{
    ActorId, CustomerId, DeviceId, Priority, TechnicianId, WorkOrder, WorkOrderId, WorkOrderStatus,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Retry budget for optimistic-lock conflicts.
const SAVE_ATTEMPTS: u32 = 3;

/// A request to open a new work order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkOrder {
    /// The owning customer.
    pub customer_id: CustomerId,
    /// The serviced hardware unit.
    pub device_id: DeviceId,
    /// Priority classification.
    pub priority: Priority,
    /// Estimated repair cost.
    pub estimated_cost: f64,
}

/// Creates and mutates work orders against the injected collaborators.
pub struct WorkOrderService {
    allocator: SequenceAllocator,
    engine: LifecycleEngine,
    store: Arc<dyn WorkOrderStore>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl WorkOrderService {
    /// Creates a service from its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn WorkOrderStore>,
        counters: Arc<dyn CounterStore>,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            allocator: SequenceAllocator::new(counters),
            engine: LifecycleEngine::new(Arc::clone(&clock)),
            store,
            notifier,
            clock,
        }
    }

    /// Opens a new work order in Triage, allocating the day's next
    /// number.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::CapacityExceeded` when today's sequence is
    /// exhausted, or a storage error if persistence fails.
    pub fn create(&self, request: NewWorkOrder, actor: &ActorId) -> Result<WorkOrder, CoreError> {
        let number = self.allocator.allocate_number(self.clock.today())?;
        let order = self.store.insert(NewWorkOrderRecord {
            number,
            priority: request.priority,
            customer_id: request.customer_id,
            device_id: request.device_id,
            estimated_cost: request.estimated_cost,
            created_at: self.clock.now_utc(),
            created_by: actor.clone(),
        })?;

        info!(number = %order.number, customer = %order.customer_id, "work order opened");
        Ok(order)
    }

    /// Loads a work order.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if the order does not exist.
    pub fn get(&self, id: WorkOrderId) -> Result<WorkOrder, CoreError> {
        Ok(self.store.load(id)?)
    }

    /// Applies a status transition, publishing the resulting event.
    ///
    /// The load-transition-save cycle retries on stale versions, up to
    /// three attempts with a fresh read each time. A retry re-validates
    /// the transition against the re-read status, so a competing change
    /// that makes the edge illegal surfaces as `InvalidTransition`, not a
    /// silent double-apply.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` (wrapped) for illegal
    /// edges, `CoreError::ConcurrencyConflict` when contention persists
    /// past the retry budget, or a storage error if persistence fails.
    pub fn change_status(
        &self,
        id: WorkOrderId,
        new_status: WorkOrderStatus,
        actor: &ActorId,
    ) -> Result<WorkOrder, CoreError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let order = self.store.load(id)?;
            let outcome = self.engine.transition(&order, new_status, actor)?;

            match self.store.save(&outcome.order, order.version) {
                Ok(()) => {
                    self.notifier.publish(outcome.event);
                    return Ok(outcome.order);
                }
                Err(StorageError::VersionConflict { resource }) => {
                    if attempt >= SAVE_ATTEMPTS {
                        return Err(CoreError::ConcurrencyConflict { resource });
                    }
                    warn!(number = %order.number, attempt, "stale version on status change, retrying");
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    /// Assigns a technician to a work order.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ConcurrencyConflict` when contention persists
    /// past the retry budget, or a storage error if persistence fails.
    pub fn assign_technician(
        &self,
        id: WorkOrderId,
        technician_id: TechnicianId,
        actor: &ActorId,
    ) -> Result<WorkOrder, CoreError> {
        self.mutate(id, actor, |order| {
            order.technician_id = Some(technician_id);
        })
    }

    /// Records the actual repair cost.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ConcurrencyConflict` when contention persists
    /// past the retry budget, or a storage error if persistence fails.
    pub fn record_actual_cost(
        &self,
        id: WorkOrderId,
        actual_cost: f64,
        actor: &ActorId,
    ) -> Result<WorkOrder, CoreError> {
        self.mutate(id, actor, |order| {
            order.actual_cost = Some(actual_cost);
        })
    }

    /// Deletes a work order still in Triage.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` (wrapped) once the order has
    /// left Triage, or `CoreError::NotFound` if it does not exist.
    pub fn delete(&self, id: WorkOrderId) -> Result<(), CoreError> {
        let order = self.store.load(id)?;
        ensure_deletable(&order)?;
        self.store.delete(id)?;

        info!(number = %order.number, "work order deleted");
        Ok(())
    }

    /// Applies a field mutation with stamping and bounded optimistic
    /// retry.
    fn mutate(
        &self,
        id: WorkOrderId,
        actor: &ActorId,
        apply: impl Fn(&mut WorkOrder),
    ) -> Result<WorkOrder, CoreError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let order = self.store.load(id)?;

            let mut updated = order.clone();
            apply(&mut updated);
            updated.updated_at = self.clock.now_utc();
            updated.updated_by = actor.clone();
            updated.version += 1;

            match self.store.save(&updated, order.version) {
                Ok(()) => return Ok(updated),
                Err(StorageError::VersionConflict { resource }) => {
                    if attempt >= SAVE_ATTEMPTS {
                        return Err(CoreError::ConcurrencyConflict { resource });
                    }
                    warn!(number = %order.number, attempt, "stale version on update, retrying");
                }
                Err(other) => return Err(other.into()),
            }
        }
    }
}
