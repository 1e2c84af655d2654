// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The in-memory backend.
//!
//! Locking scopes: counters use one cell per date behind a shared map (the
//! map lock is held only to locate or create the cell, never across the
//! compare-and-set), schedules use one book lock whose write side covers
//! the overlap re-check and the insert together, and work orders use a
//! single map lock with versioned saves.

use fixflow::{
    CounterStore, NewScheduleRecord, NewWorkOrderRecord, ReportingStore, ScheduleStore,
    StorageError, WorkOrderFilter, WorkOrderStore, has_conflict,
};
use fixflow_domain::{
    ScheduleEntry, ScheduleEntryId, ScheduleEntryStatus, TechnicianId, TimeInterval, TimeLogEntry,
    WorkOrder, WorkOrderId, WorkOrderStatus,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use time::{Date, OffsetDateTime};
use tracing::debug;

/// One day's sequence cell. `None` until the first allocation.
type CounterCell = Arc<Mutex<Option<u16>>>;

/// Schedule entries bucketed per technician and date, with an id index
/// for direct lookup.
#[derive(Default)]
struct ScheduleBook {
    buckets: HashMap<(TechnicianId, Date), Vec<ScheduleEntry>>,
    index: HashMap<ScheduleEntryId, (TechnicianId, Date)>,
}

impl ScheduleBook {
    fn blocking_intervals(&self, technician_id: TechnicianId, date: Date) -> Vec<TimeInterval> {
        self.buckets
            .get(&(technician_id, date))
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.blocks_time())
                    .map(|e| e.interval)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn entry_mut(&mut self, id: ScheduleEntryId) -> Option<&mut ScheduleEntry> {
        let key = self.index.get(&id)?;
        self.buckets
            .get_mut(key)?
            .iter_mut()
            .find(|e| e.id == id)
    }

    fn entry(&self, id: ScheduleEntryId) -> Option<&ScheduleEntry> {
        let key = self.index.get(&id)?;
        self.buckets.get(key)?.iter().find(|e| e.id == id)
    }
}

/// An in-memory implementation of every store interface the engines
/// consume.
///
/// Cloning is not provided; share the store behind an [`Arc`] the same way
/// a connection pool would be shared.
#[derive(Default)]
pub struct MemoryStore {
    counters: RwLock<HashMap<Date, CounterCell>>,
    schedules: RwLock<ScheduleBook>,
    orders: RwLock<HashMap<WorkOrderId, WorkOrder>>,
    time_logs: RwLock<Vec<TimeLogEntry>>,
    next_work_order_id: AtomicI64,
    next_schedule_entry_id: AtomicI64,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a technician time log for later aggregation.
    pub fn record_time_log(&self, log: TimeLogEntry) {
        self.time_logs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(log);
    }

    /// Locates the counter cell for a date, creating it on first use.
    ///
    /// The map lock is released before the caller touches the cell, so
    /// allocations for different dates never serialize on each other.
    fn counter_cell(&self, date: Date) -> CounterCell {
        if let Some(cell) = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&date)
        {
            return Arc::clone(cell);
        }
        let mut counters = self
            .counters
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(counters.entry(date).or_default())
    }
}

impl CounterStore for MemoryStore {
    fn load(&self, date: Date) -> Result<Option<u16>, StorageError> {
        let cell = self.counter_cell(date);
        let value = *cell.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(value)
    }

    fn compare_and_set(
        &self,
        date: Date,
        expected: Option<u16>,
        next: u16,
    ) -> Result<bool, StorageError> {
        let cell = self.counter_cell(date);
        let mut current = cell.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == expected {
            *current = Some(next);
            debug!(%date, sequence = next, "counter advanced");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

impl ScheduleStore for MemoryStore {
    fn blocking_intervals(
        &self,
        technician_id: TechnicianId,
        date: Date,
    ) -> Result<Vec<TimeInterval>, StorageError> {
        Ok(self
            .schedules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .blocking_intervals(technician_id, date))
    }

    fn insert(&self, record: NewScheduleRecord) -> Result<ScheduleEntry, StorageError> {
        let mut book = self
            .schedules
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        // Re-check under the write lock: a booking that raced past the
        // caller's conflict check is rejected here.
        let committed = book.blocking_intervals(record.technician_id, record.date);
        if has_conflict(&committed, &record.interval) {
            return Err(StorageError::Conflict {
                technician_id: record.technician_id,
                date: record.date,
                start: record.interval.start(),
                end: record.interval.end(),
            });
        }

        let id =
            ScheduleEntryId::new(self.next_schedule_entry_id.fetch_add(1, Ordering::SeqCst) + 1);
        let entry = ScheduleEntry {
            id,
            work_order_id: record.work_order_id,
            technician_id: record.technician_id,
            date: record.date,
            interval: record.interval,
            status: ScheduleEntryStatus::Scheduled,
        };

        let key = (record.technician_id, record.date);
        book.buckets.entry(key).or_default().push(entry.clone());
        book.index.insert(id, key);

        debug!(entry = %id, technician = %record.technician_id, date = %record.date, "reservation stored");
        Ok(entry)
    }

    fn load_entry(&self, id: ScheduleEntryId) -> Result<ScheduleEntry, StorageError> {
        self.schedules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("schedule_entry/{id}")))
    }

    fn update(&self, entry: &ScheduleEntry) -> Result<(), StorageError> {
        let mut book = self
            .schedules
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let stored = book
            .entry_mut(entry.id)
            .ok_or_else(|| StorageError::NotFound(format!("schedule_entry/{}", entry.id)))?;
        *stored = entry.clone();
        Ok(())
    }
}

impl WorkOrderStore for MemoryStore {
    fn insert(&self, record: NewWorkOrderRecord) -> Result<WorkOrder, StorageError> {
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        if orders.values().any(|o| o.number == record.number) {
            return Err(StorageError::Backend(format!(
                "work-order number {} already exists",
                record.number
            )));
        }

        let id = WorkOrderId::new(self.next_work_order_id.fetch_add(1, Ordering::SeqCst) + 1);
        let order = WorkOrder {
            id,
            number: record.number,
            status: WorkOrderStatus::Triage,
            priority: record.priority,
            customer_id: record.customer_id,
            device_id: record.device_id,
            technician_id: None,
            created_at: record.created_at,
            updated_at: record.created_at,
            updated_by: record.created_by,
            completed_at: None,
            estimated_cost: record.estimated_cost,
            actual_cost: None,
            version: 1,
        };
        orders.insert(id, order.clone());

        debug!(number = %order.number, "work order stored");
        Ok(order)
    }

    fn load(&self, id: WorkOrderId) -> Result<WorkOrder, StorageError> {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("work_order/{id}")))
    }

    fn save(&self, order: &WorkOrder, expected_version: u32) -> Result<(), StorageError> {
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        let stored = orders
            .get_mut(&order.id)
            .ok_or_else(|| StorageError::NotFound(format!("work_order/{}", order.id)))?;
        if stored.version != expected_version {
            return Err(StorageError::VersionConflict {
                resource: format!("work_order/{}", order.id),
            });
        }
        *stored = order.clone();
        Ok(())
    }

    fn delete(&self, id: WorkOrderId) -> Result<(), StorageError> {
        self.orders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("work_order/{id}")))
    }
}

impl ReportingStore for MemoryStore {
    fn work_orders(&self, filter: &WorkOrderFilter) -> Result<Vec<WorkOrder>, StorageError> {
        Ok(self
            .orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|o| filter.technician_id.is_none_or(|t| o.technician_id == Some(t)))
            .filter(|o| filter.customer_id.is_none_or(|c| o.customer_id == c))
            .filter(|o| filter.created_from.is_none_or(|from| o.created_at >= from))
            .filter(|o| filter.created_to.is_none_or(|to| o.created_at < to))
            .cloned()
            .collect())
    }

    fn time_logs(
        &self,
        technician_id: TechnicianId,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<TimeLogEntry>, StorageError> {
        Ok(self
            .time_logs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|log| {
                log.technician_id == technician_id && log.started_at >= from && log.started_at < to
            })
            .cloned()
            .collect())
    }
}
