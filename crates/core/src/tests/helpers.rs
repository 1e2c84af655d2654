// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory test doubles for the collaborator interfaces.

use crate::clock::FixedClock;
use crate::lifecycle::StatusChangeEvent;
use crate::ports::{
    CounterStore, NewScheduleRecord, NewWorkOrderRecord, NotificationSink, ReportingStore,
    ScheduleStore, StorageError, WorkOrderFilter, WorkOrderStore,
};
use crate::scheduling::has_conflict;
use fixflow_domain::{
    ActorId, CustomerId, DeviceId, Priority, ScheduleEntry, ScheduleEntryId, ScheduleEntryStatus,
    TechnicianId, TimeInterval, TimeLogEntry, WorkOrder, WorkOrderId, WorkOrderNumber,
    WorkOrderStatus,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use time::macros::datetime;
use time::{Date, Duration, OffsetDateTime};

pub fn test_instant() -> OffsetDateTime {
    datetime!(2026-03-02 09:00 UTC)
}

pub fn test_clock() -> FixedClock {
    FixedClock::new(test_instant())
}

pub fn test_actor() -> ActorId {
    ActorId::new("op-7")
}

/// Counter store backed by a plain map. Single-lock, good enough for
/// single-threaded engine tests.
#[derive(Default)]
pub struct MemoryCounters {
    counters: Mutex<HashMap<Date, u16>>,
}

impl CounterStore for MemoryCounters {
    fn load(&self, date: Date) -> Result<Option<u16>, StorageError> {
        Ok(self.counters.lock().unwrap().get(&date).copied())
    }

    fn compare_and_set(
        &self,
        date: Date,
        expected: Option<u16>,
        next: u16,
    ) -> Result<bool, StorageError> {
        let mut counters = self.counters.lock().unwrap();
        if counters.get(&date).copied() == expected {
            counters.insert(date, next);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Counter store that loses the first compare-and-set to a simulated
/// rival writer, forcing the allocator's retry path.
#[derive(Default)]
pub struct ContendedCounters {
    inner: MemoryCounters,
    contended: AtomicU32,
}

impl ContendedCounters {
    pub fn contention_count(&self) -> u32 {
        self.contended.load(Ordering::SeqCst)
    }
}

impl CounterStore for ContendedCounters {
    fn load(&self, date: Date) -> Result<Option<u16>, StorageError> {
        self.inner.load(date)
    }

    fn compare_and_set(
        &self,
        date: Date,
        expected: Option<u16>,
        next: u16,
    ) -> Result<bool, StorageError> {
        if self.contended.fetch_add(1, Ordering::SeqCst) == 0 {
            // A rival allocator slips in and takes the observed successor.
            let rival = expected.unwrap_or(0) + 1;
            self.inner.compare_and_set(date, expected, rival)?;
            return Ok(false);
        }
        self.inner.compare_and_set(date, expected, next)
    }
}

/// Work-order store backed by a plain map with versioned saves.
#[derive(Default)]
pub struct MemoryWorkOrders {
    orders: Mutex<HashMap<WorkOrderId, WorkOrder>>,
    next_id: AtomicI64,
}

impl WorkOrderStore for MemoryWorkOrders {
    fn insert(&self, record: NewWorkOrderRecord) -> Result<WorkOrder, StorageError> {
        let id = WorkOrderId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
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
        self.orders.lock().unwrap().insert(id, order.clone());
        Ok(order)
    }

    fn load(&self, id: WorkOrderId) -> Result<WorkOrder, StorageError> {
        self.orders
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("work_order/{id}")))
    }

    fn save(&self, order: &WorkOrder, expected_version: u32) -> Result<(), StorageError> {
        let mut orders = self.orders.lock().unwrap();
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
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("work_order/{id}")))
    }
}

/// Work-order store whose saves always lose the optimistic-lock check.
pub struct AlwaysStale {
    inner: MemoryWorkOrders,
    save_attempts: AtomicU32,
}

impl AlwaysStale {
    pub fn new(inner: MemoryWorkOrders) -> Self {
        Self {
            inner,
            save_attempts: AtomicU32::new(0),
        }
    }

    pub fn save_attempts(&self) -> u32 {
        self.save_attempts.load(Ordering::SeqCst)
    }
}

impl WorkOrderStore for AlwaysStale {
    fn insert(&self, record: NewWorkOrderRecord) -> Result<WorkOrder, StorageError> {
        self.inner.insert(record)
    }

    fn load(&self, id: WorkOrderId) -> Result<WorkOrder, StorageError> {
        self.inner.load(id)
    }

    fn save(&self, order: &WorkOrder, _expected_version: u32) -> Result<(), StorageError> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::VersionConflict {
            resource: format!("work_order/{}", order.id),
        })
    }

    fn delete(&self, id: WorkOrderId) -> Result<(), StorageError> {
        self.inner.delete(id)
    }
}

/// Work-order store whose first save observes a stale version, as if a
/// competing writer committed between load and save.
pub struct StaleOnce {
    inner: MemoryWorkOrders,
    remaining_failures: AtomicU32,
}

impl StaleOnce {
    pub fn new(inner: MemoryWorkOrders) -> Self {
        Self {
            inner,
            remaining_failures: AtomicU32::new(1),
        }
    }
}

impl WorkOrderStore for StaleOnce {
    fn insert(&self, record: NewWorkOrderRecord) -> Result<WorkOrder, StorageError> {
        self.inner.insert(record)
    }

    fn load(&self, id: WorkOrderId) -> Result<WorkOrder, StorageError> {
        self.inner.load(id)
    }

    fn save(&self, order: &WorkOrder, expected_version: u32) -> Result<(), StorageError> {
        if self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StorageError::VersionConflict {
                resource: format!("work_order/{}", order.id),
            });
        }
        self.inner.save(order, expected_version)
    }

    fn delete(&self, id: WorkOrderId) -> Result<(), StorageError> {
        self.inner.delete(id)
    }
}

/// Schedule store backed by a vector, re-checking overlap on insert.
#[derive(Default)]
pub struct MemorySchedules {
    entries: Mutex<Vec<ScheduleEntry>>,
    next_id: AtomicI64,
}

impl ScheduleStore for MemorySchedules {
    fn blocking_intervals(
        &self,
        technician_id: TechnicianId,
        date: Date,
    ) -> Result<Vec<TimeInterval>, StorageError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.technician_id == technician_id && e.date == date && e.blocks_time())
            .map(|e| e.interval)
            .collect())
    }

    fn insert(&self, record: NewScheduleRecord) -> Result<ScheduleEntry, StorageError> {
        let mut entries = self.entries.lock().unwrap();
        let committed: Vec<TimeInterval> = entries
            .iter()
            .filter(|e| {
                e.technician_id == record.technician_id && e.date == record.date && e.blocks_time()
            })
            .map(|e| e.interval)
            .collect();
        if has_conflict(&committed, &record.interval) {
            return Err(StorageError::Conflict {
                technician_id: record.technician_id,
                date: record.date,
                start: record.interval.start(),
                end: record.interval.end(),
            });
        }

        let entry = ScheduleEntry {
            id: ScheduleEntryId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            work_order_id: record.work_order_id,
            technician_id: record.technician_id,
            date: record.date,
            interval: record.interval,
            status: ScheduleEntryStatus::Scheduled,
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    fn load_entry(&self, id: ScheduleEntryId) -> Result<ScheduleEntry, StorageError> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("schedule_entry/{id}")))
    }

    fn update(&self, entry: &ScheduleEntry) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap();
        let stored = entries
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| StorageError::NotFound(format!("schedule_entry/{}", entry.id)))?;
        *stored = entry.clone();
        Ok(())
    }
}

/// Reporting store over preloaded snapshots.
#[derive(Default)]
pub struct MemoryReporting {
    pub orders: Vec<WorkOrder>,
    pub logs: Vec<TimeLogEntry>,
}

impl ReportingStore for MemoryReporting {
    fn work_orders(&self, filter: &WorkOrderFilter) -> Result<Vec<WorkOrder>, StorageError> {
        Ok(self
            .orders
            .iter()
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
            .logs
            .iter()
            .filter(|log| {
                log.technician_id == technician_id && log.started_at >= from && log.started_at < to
            })
            .cloned()
            .collect())
    }
}

/// Notification sink that records every published event.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<StatusChangeEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<StatusChangeEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, event: StatusChangeEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn make_order(id: i64, status: WorkOrderStatus) -> WorkOrder {
    let created_at = test_instant();
    WorkOrder {
        id: WorkOrderId::new(id),
        number: WorkOrderNumber::compose(created_at.date(), u16::try_from(id).unwrap()).unwrap(),
        status,
        priority: Priority::Medium,
        customer_id: CustomerId::new(501),
        device_id: DeviceId::new(900),
        technician_id: None,
        created_at,
        updated_at: created_at,
        updated_by: test_actor(),
        completed_at: None,
        estimated_cost: 120.0,
        actual_cost: None,
        version: 1,
    }
}

pub fn make_closed_order(id: i64, repair_minutes: i64, actual_cost: f64) -> WorkOrder {
    let mut order = make_order(id, WorkOrderStatus::Closure);
    order.completed_at = Some(order.created_at + Duration::minutes(repair_minutes));
    order.actual_cost = Some(actual_cost);
    order
}

pub fn make_log(technician_id: i64, started_at: OffsetDateTime, minutes: u32) -> TimeLogEntry {
    TimeLogEntry {
        technician_id: TechnicianId::new(technician_id),
        work_order_id: WorkOrderId::new(1),
        activity: String::from("repair"),
        started_at,
        ended_at: Some(started_at + Duration::minutes(i64::from(minutes))),
        minutes,
        total_cost: 80.0,
    }
}
