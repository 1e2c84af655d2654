// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod workorder_tests;

use fixflow::{FixedClock, NotificationSink, StatusChangeEvent};
use fixflow_domain::{ActorId, CustomerId, DeviceId, Priority};
use time::OffsetDateTime;
use time::macros::datetime;

pub fn test_instant() -> OffsetDateTime {
    datetime!(2026-03-02 09:00 UTC)
}

pub fn test_clock() -> FixedClock {
    FixedClock::new(test_instant())
}

pub fn test_actor() -> ActorId {
    ActorId::new("op-7")
}

pub fn new_request() -> fixflow::NewWorkOrder {
    fixflow::NewWorkOrder {
        customer_id: CustomerId::new(501),
        device_id: DeviceId::new(900),
        priority: Priority::Medium,
        estimated_cost: 180.0,
    }
}

/// Discards every event. Delivery mechanics are out of scope here.
pub struct NullSink;

impl NotificationSink for NullSink {
    fn publish(&self, _event: StatusChangeEvent) {}
}
