// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::MemoryStore;
use crate::tests::{NullSink, new_request, test_actor, test_clock, test_instant};
use fixflow::{
    NewWorkOrderRecord, ReportingStore, StorageError, WorkOrderFilter, WorkOrderService,
    WorkOrderStore,
};
use fixflow_domain::{
    CustomerId, DeviceId, Priority, TechnicianId, TimeLogEntry, WorkOrderId, WorkOrderNumber,
    WorkOrderStatus,
};
use std::sync::Arc;
use std::thread;
use time::Duration;
use time::macros::date;

fn record(number: &str) -> NewWorkOrderRecord {
    NewWorkOrderRecord {
        number: number.parse::<WorkOrderNumber>().unwrap(),
        priority: Priority::Medium,
        customer_id: CustomerId::new(501),
        device_id: DeviceId::new(900),
        estimated_cost: 180.0,
        created_at: test_instant(),
        created_by: test_actor(),
    }
}

fn service(store: &Arc<MemoryStore>) -> WorkOrderService {
    WorkOrderService::new(
        Arc::clone(store),
        Arc::clone(store),
        Arc::new(NullSink),
        Arc::new(test_clock()),
    )
}

#[test]
fn test_insert_assigns_identifier_and_initial_state() {
    let store = MemoryStore::new();

    let order = WorkOrderStore::insert(&store, record("260302001")).unwrap();

    assert_eq!(order.id, WorkOrderId::new(1));
    assert_eq!(order.status, WorkOrderStatus::Triage);
    assert_eq!(order.version, 1);
    assert_eq!(order.completed_at, None);
}

#[test]
fn test_duplicate_number_is_rejected() {
    let store = MemoryStore::new();
    WorkOrderStore::insert(&store, record("260302001")).unwrap();

    let result = WorkOrderStore::insert(&store, record("260302001"));

    assert!(matches!(result.unwrap_err(), StorageError::Backend(_)));
}

#[test]
fn test_save_with_current_version_succeeds() {
    let store = MemoryStore::new();
    let order = WorkOrderStore::insert(&store, record("260302001")).unwrap();

    let mut updated = order.clone();
    updated.status = WorkOrderStatus::Quotation;
    updated.version = 2;

    store.save(&updated, order.version).unwrap();
    assert_eq!(store.load(order.id).unwrap().version, 2);
}

#[test]
fn test_save_with_stale_version_is_rejected() {
    let store = MemoryStore::new();
    let order = WorkOrderStore::insert(&store, record("260302001")).unwrap();

    let mut first = order.clone();
    first.version = 2;
    store.save(&first, order.version).unwrap();

    // A second writer still holding version 1 must lose.
    let mut second = order.clone();
    second.technician_id = Some(TechnicianId::new(3));
    second.version = 2;
    let result = store.save(&second, order.version);

    assert!(matches!(
        result.unwrap_err(),
        StorageError::VersionConflict { .. }
    ));
}

#[test]
fn test_concurrent_status_changes_both_settle() {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(service(&store));
    let order = service.create(new_request(), &test_actor()).unwrap();

    let transition = {
        let service = Arc::clone(&service);
        let id = order.id;
        thread::spawn(move || service.change_status(id, WorkOrderStatus::Quotation, &test_actor()))
    };
    let assignment = {
        let service = Arc::clone(&service);
        let id = order.id;
        thread::spawn(move || service.assign_technician(id, TechnicianId::new(3), &test_actor()))
    };

    transition.join().unwrap().unwrap();
    assignment.join().unwrap().unwrap();

    let settled = service.get(order.id).unwrap();
    assert_eq!(settled.status, WorkOrderStatus::Quotation);
    assert_eq!(settled.technician_id, Some(TechnicianId::new(3)));
    assert_eq!(settled.version, 3);
}

#[test]
fn test_service_numbers_are_dense_across_threads() {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(service(&store));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                (0..10)
                    .map(|_| {
                        service
                            .create(new_request(), &test_actor())
                            .unwrap()
                            .number
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut sequences: Vec<u16> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .map(|number| number.decompose().unwrap().1)
        .collect();
    sequences.sort_unstable();

    let expected: Vec<u16> = (1..=60).collect();
    assert_eq!(sequences, expected);
}

#[test]
fn test_delete_removes_the_order() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);
    let order = service.create(new_request(), &test_actor()).unwrap();

    service.delete(order.id).unwrap();

    assert!(store.load(order.id).is_err());
}

#[test]
fn test_reporting_sees_persisted_orders() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);
    let order = service.create(new_request(), &test_actor()).unwrap();
    service
        .change_status(order.id, WorkOrderStatus::Quotation, &test_actor())
        .unwrap();

    let snapshot = store.work_orders(&WorkOrderFilter::default()).unwrap();

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].status, WorkOrderStatus::Quotation);
}

#[test]
fn test_time_log_window_is_half_open() {
    let store = MemoryStore::new();
    let log = |started_at, minutes| TimeLogEntry {
        technician_id: TechnicianId::new(3),
        work_order_id: WorkOrderId::new(1),
        activity: String::from("repair"),
        started_at,
        ended_at: None,
        minutes,
        total_cost: 80.0,
    };
    store.record_time_log(log(test_instant(), 60));
    store.record_time_log(log(test_instant() - Duration::days(10), 45));

    let from = test_instant() - Duration::days(7);
    let to = test_instant() + Duration::minutes(1);
    let logs = store.time_logs(TechnicianId::new(3), from, to).unwrap();

    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].minutes, 60);
    assert_eq!(logs[0].started_at.date(), date!(2026 - 03 - 02));
}
