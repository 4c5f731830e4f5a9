//! Builders for stored work request rows.

#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use workboard::model::WorkRequest;

/// Fixed reference instant for seeded rows: 2026-10-16 00:00 UTC.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Builder for rows as the store would return them.
pub struct RequestBuilder {
    row: WorkRequest,
}

impl RequestBuilder {
    /// Row `id` created `id` minutes after [`base_time`].
    pub fn new(id: i64) -> Self {
        Self {
            row: WorkRequest {
                id,
                company: format!("Company {}", id),
                program: "Banner".to_string(),
                pickup_date: date(2026, 10, 20),
                note: None,
                image_url: None,
                is_urgent: false,
                completed: false,
                is_deleted: false,
                is_just_upload: None,
                is_work_done: None,
                creator: None,
                check_marks: None,
                created_at: base_time() + Duration::minutes(id),
                updated_at: None,
                deleted_at: None,
            },
        }
    }

    pub fn company(mut self, company: &str) -> Self {
        self.row.company = company.to_string();
        self
    }

    pub fn program(mut self, program: &str) -> Self {
        self.row.program = program.to_string();
        self
    }

    pub fn creator(mut self, creator: &str) -> Self {
        self.row.creator = Some(creator.to_string());
        self
    }

    pub fn pickup(mut self, pickup_date: NaiveDate) -> Self {
        self.row.pickup_date = pickup_date;
        self
    }

    pub fn urgent(mut self) -> Self {
        self.row.is_urgent = true;
        self
    }

    pub fn just_upload(mut self) -> Self {
        self.row.is_just_upload = Some(true);
        self
    }

    pub fn created_minutes(mut self, minutes: i64) -> Self {
        self.row.created_at = base_time() + Duration::minutes(minutes);
        self
    }

    /// Completed `minutes` after [`base_time`].
    pub fn completed_at(mut self, minutes: i64) -> Self {
        self.row.completed = true;
        self.row.updated_at = Some(base_time() + Duration::minutes(minutes));
        self
    }

    pub fn completed(mut self) -> Self {
        self.row.completed = true;
        self
    }

    /// Soft-deleted `minutes` after [`base_time`].
    pub fn deleted_at(mut self, minutes: i64) -> Self {
        self.row.is_deleted = true;
        self.row.deleted_at = Some(base_time() + Duration::minutes(minutes));
        self
    }

    pub fn build(self) -> WorkRequest {
        self.row
    }
}
