// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar-day arithmetic.

use chrono::{DateTime, NaiveDate, Utc};

/// Calendar day (UTC) of a timestamp, with the time of day dropped.
pub fn calendar_day(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// Whole days from `earlier` to `later`. Negative when `earlier` is in the future.
pub fn days_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days()
}
