use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

use crate::model::WorkRequest;

/// Calendar date of `now` at a fixed UTC offset (the shop's local day).
pub fn local_today(now: DateTime<Utc>, utc_offset_hours: i32) -> NaiveDate {
    match FixedOffset::east_opt(utc_offset_hours * 3600) {
        Some(offset) => now.with_timezone(&offset).date_naive(),
        None => now.date_naive(),
    }
}

/// Whole days from `today` to `pickup_date`: 0 is due today, negative is overdue.
pub fn days_left(pickup_date: NaiveDate, today: NaiveDate) -> i64 {
    (pickup_date - today).num_days()
}

/// Urgency badge shown on an in-progress card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum PickupLabel {
    Urgent,
    Today,
    DaysLeft(i64),
    Overdue,
}

impl PickupLabel {
    /// Manual urgency outranks the date-derived label.
    pub fn for_request(row: &WorkRequest, today: NaiveDate) -> Self {
        if row.is_urgent {
            return PickupLabel::Urgent;
        }
        Self::for_date(row.pickup_date, today)
    }

    pub fn for_date(pickup_date: NaiveDate, today: NaiveDate) -> Self {
        match days_left(pickup_date, today) {
            0 => PickupLabel::Today,
            n if n > 0 => PickupLabel::DaysLeft(n),
            _ => PickupLabel::Overdue,
        }
    }
}

impl fmt::Display for PickupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PickupLabel::Urgent => write!(f, "급함"),
            PickupLabel::Today => write!(f, "오늘"),
            PickupLabel::DaysLeft(n) => write!(f, "D-{}", n),
            PickupLabel::Overdue => write!(f, "지남"),
        }
    }
}
