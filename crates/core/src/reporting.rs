// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! KPI reporting over store snapshots.
//!
//! The math lives in `fixflow_domain::kpi` and is pure; this service only
//! fetches consistent snapshots and delegates. Nothing here mutates
//! state.

use crate::clock::Clock;
use crate::error::CoreError;
use crate::ports::{ReportingStore, WorkOrderFilter};
use fixflow_domain::{DomainError, RepairKpis, RevenueGrowth, TechnicianId};
use std::sync::Arc;
use time::{Date, Duration};

/// A half-open calendar period `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// Creates a period.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPeriod` if `start >= end`.
    pub fn new(start: Date, end: Date) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the period's first date.
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Returns the period's exclusive end date.
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }
}

/// Computes derived performance figures from persisted history.
pub struct ReportingService {
    store: Arc<dyn ReportingStore>,
    clock: Arc<dyn Clock>,
}

impl ReportingService {
    /// Creates a service over a reporting store and a clock.
    #[must_use]
    pub fn new(store: Arc<dyn ReportingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Computes ATTR, FTFR, and ATCR over the orders matching a filter.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend fails.
    pub fn repair_kpis(&self, filter: &WorkOrderFilter) -> Result<RepairKpis, CoreError> {
        let orders = self.store.work_orders(filter)?;
        Ok(fixflow_domain::repair_kpis(&orders))
    }

    /// Computes a technician's utilization over a trailing window ending
    /// now.
    ///
    /// The window is expressed as a duration (for example seven days);
    /// utilization is logged time against the whole window, capped at
    /// 100%.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend fails.
    #[allow(clippy::cast_precision_loss)]
    pub fn technician_utilization(
        &self,
        technician_id: TechnicianId,
        window: Duration,
    ) -> Result<f64, CoreError> {
        let now = self.clock.now_utc();
        let logs = self.store.time_logs(technician_id, now - window, now)?;
        let logged_minutes: u32 = logs.iter().map(|log| log.minutes).sum();

        Ok(fixflow_domain::technician_utilization(
            f64::from(logged_minutes),
            window.whole_minutes() as f64 / 60.0,
        ))
    }

    /// Computes revenue growth between two periods.
    ///
    /// Period revenue is the sum of recorded actual costs over orders
    /// completed within the period. A zero prior period is reported as
    /// rate 0 with the undefined flag set.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend fails.
    pub fn revenue_growth(
        &self,
        current: DateRange,
        prior: DateRange,
    ) -> Result<RevenueGrowth, CoreError> {
        let orders = self.store.work_orders(&WorkOrderFilter::default())?;
        let current_revenue =
            fixflow_domain::period_revenue(&orders, current.start(), current.end());
        let prior_revenue = fixflow_domain::period_revenue(&orders, prior.start(), prior.end());

        Ok(fixflow_domain::revenue_growth(current_revenue, prior_revenue))
    }
}
