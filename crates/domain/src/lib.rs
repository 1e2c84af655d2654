// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod interval;
mod kpi;
mod number;
mod types;

pub use error::DomainError;
pub use interval::TimeInterval;
pub use kpi::{
    RepairKpis, RevenueGrowth, period_revenue, repair_kpis, revenue_growth,
    technician_utilization,
};
pub use number::{MAX_SEQUENCE, WorkOrderNumber};
pub use types::{
    ActorId, CustomerId, DeviceId, Priority, ScheduleEntry, ScheduleEntryId, ScheduleEntryStatus,
    TechnicianId, TimeLogEntry, WorkOrder, WorkOrderId, WorkOrderStatus,
};
