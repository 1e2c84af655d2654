// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Repair-shop performance figures.
//!
//! Every function here is deterministic, side-effect-free, and total over
//! empty input. Callers fetch a consistent snapshot and hand it in; nothing
//! in this module touches persistence.

use crate::types::WorkOrder;
use serde::{Deserialize, Serialize};
use time::Date;

/// Derived repair performance figures over a set of work orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairKpis {
    /// Number of work orders in the input set.
    pub total_count: usize,
    /// Number of completed (closed) work orders in the input set.
    pub closed_count: usize,
    /// Average Time to Repair: mean `completed_at - created_at` over
    /// completed orders, in minutes. 0 when none are completed.
    pub average_time_to_repair_minutes: f64,
    /// First-Time Fix Rate: `closed / total * 100`, rounded to two
    /// decimals. 0 when the input set is empty.
    pub first_time_fix_rate: f64,
    /// Average Total Cost per Repair: mean recorded `actual_cost` over
    /// completed orders. 0 when none carry an actual cost.
    pub average_cost_per_repair: f64,
}

/// Revenue growth between two periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueGrowth {
    /// `(current - prior) / prior * 100`; 0 when the prior period had no
    /// revenue.
    pub rate: f64,
    /// True when the prior period had no revenue, making the rate
    /// undefined. The rate is reported as 0 in that case.
    pub prior_period_empty: bool,
}

/// Computes ATTR, FTFR, and ATCR over a set of work orders.
///
/// An order counts as closed when it carries a completion timestamp; per
/// the lifecycle invariant that covers Closure and Warranty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn repair_kpis(orders: &[WorkOrder]) -> RepairKpis {
    let total_count = orders.len();
    let closed: Vec<&WorkOrder> = orders.iter().filter(|o| o.is_completed()).collect();
    let closed_count = closed.len();

    let average_time_to_repair_minutes = if closed.is_empty() {
        0.0
    } else {
        let total_minutes: f64 = closed
            .iter()
            .filter_map(|o| {
                o.completed_at
                    .map(|completed| (completed - o.created_at).whole_seconds() as f64 / 60.0)
            })
            .sum();
        total_minutes / closed_count as f64
    };

    let first_time_fix_rate = if total_count == 0 {
        0.0
    } else {
        round_two(closed_count as f64 / total_count as f64 * 100.0)
    };

    let costed: Vec<f64> = closed.iter().filter_map(|o| o.actual_cost).collect();
    let average_cost_per_repair = if costed.is_empty() {
        0.0
    } else {
        costed.iter().sum::<f64>() / costed.len() as f64
    };

    RepairKpis {
        total_count,
        closed_count,
        average_time_to_repair_minutes,
        first_time_fix_rate,
        average_cost_per_repair,
    }
}

/// Computes technician utilization over a trailing window.
///
/// `logged_minutes` is the sum of time-log durations inside the window;
/// `window_hours` is the window's length in hours. The result is a
/// percentage capped at 100 so overtime does not skew reporting upward,
/// and 0 for a non-positive window.
#[must_use]
pub fn technician_utilization(logged_minutes: f64, window_hours: f64) -> f64 {
    if window_hours <= 0.0 {
        return 0.0;
    }
    (logged_minutes / 60.0 / window_hours * 100.0).min(100.0)
}

/// Computes the revenue growth rate between two periods.
///
/// A zero prior period makes the rate undefined; it is reported as 0 with
/// `prior_period_empty` set so reporting views can flag it.
#[must_use]
pub fn revenue_growth(current_revenue: f64, prior_revenue: f64) -> RevenueGrowth {
    if prior_revenue == 0.0 {
        return RevenueGrowth {
            rate: 0.0,
            prior_period_empty: true,
        };
    }
    RevenueGrowth {
        rate: (current_revenue - prior_revenue) / prior_revenue * 100.0,
        prior_period_empty: false,
    }
}

/// Sums the recorded actual cost of work orders completed within the
/// half-open date range `[start, end)`.
#[must_use]
pub fn period_revenue(orders: &[WorkOrder], start: Date, end: Date) -> f64 {
    orders
        .iter()
        .filter(|o| {
            o.completed_at
                .is_some_and(|completed| completed.date() >= start && completed.date() < end)
        })
        .filter_map(|o| o.actual_cost)
        .sum()
}

fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
