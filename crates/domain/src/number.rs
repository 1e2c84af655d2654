// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Human-readable work-order numbers.
//!
//! A work-order number encodes its creation date and a per-day sequence as
//! `YYMMDDSSS`: two-digit year, month, and day followed by a three-digit
//! zero-padded sequence. `2024-12-30` sequence 1 becomes `241230001`.
//!
//! Composition and decomposition are pure. The allocator owns the sequence
//! counter; it never derives the next sequence by scanning issued numbers.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, Month};

/// The highest sequence a single day can issue. Three digits, zero is
/// never issued.
pub const MAX_SEQUENCE: u16 = 999;

/// Two-digit years are pivoted into this century.
const YEAR_BASE: i32 = 2000;

/// A validated `YYMMDDSSS` work-order number.
///
/// Numbers are immutable once assigned and globally unique; uniqueness is
/// guaranteed by the per-day sequence allocator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkOrderNumber(String);

impl WorkOrderNumber {
    /// Composes a number from a date and a daily sequence.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SequenceOutOfRange` if `sequence` is not in
    /// `1..=999`, or `DomainError::YearOutOfRange` if the date's year falls
    /// outside 2000..=2099.
    pub fn compose(date: Date, sequence: u16) -> Result<Self, DomainError> {
        if sequence == 0 || sequence > MAX_SEQUENCE {
            return Err(DomainError::SequenceOutOfRange { sequence });
        }
        let year = date.year();
        if !(YEAR_BASE..YEAR_BASE + 100).contains(&year) {
            return Err(DomainError::YearOutOfRange { year });
        }
        Ok(Self(format!(
            "{:02}{:02}{:02}{:03}",
            year - YEAR_BASE,
            u8::from(date.month()),
            date.day(),
            sequence
        )))
    }

    /// Recovers the date and sequence this number encodes.
    ///
    /// This exists so issued numbers can be audited against the counter;
    /// allocation itself never goes through this path.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidWorkOrderNumber` if the value does not
    /// decode to a calendar date and an in-range sequence.
    pub fn decompose(&self) -> Result<(Date, u16), DomainError> {
        decode(&self.0)
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkOrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkOrderNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)?;
        Ok(Self(s.to_string()))
    }
}

fn malformed(value: &str, reason: &str) -> DomainError {
    DomainError::InvalidWorkOrderNumber {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn decode(value: &str) -> Result<(Date, u16), DomainError> {
    if value.len() != 9 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(value, "expected exactly nine digits"));
    }

    let field = |range: std::ops::Range<usize>| -> Result<u16, DomainError> {
        value[range]
            .parse::<u16>()
            .map_err(|_| malformed(value, "component is not numeric"))
    };

    let year = i32::from(field(0..2)?) + YEAR_BASE;
    let month = u8::try_from(field(2..4)?)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(|| malformed(value, "month out of range"))?;
    let day = u8::try_from(field(4..6)?).map_err(|_| malformed(value, "day out of range"))?;
    let sequence = field(6..9)?;

    let date = Date::from_calendar_date(year, month, day)
        .map_err(|_| malformed(value, "not a calendar date"))?;
    if sequence == 0 {
        return Err(malformed(value, "sequence zero is never issued"));
    }
    Ok((date, sequence))
}
