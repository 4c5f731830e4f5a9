//! Work request records as stored in the `request` table.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// An annotation point over the manuscript image, in image-relative units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckMark {
    pub x: f64,
    pub y: f64,
}

/// A single print/production job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRequest {
    pub id: i64,
    pub company: String,
    pub program: String,
    pub pickup_date: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_urgent: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub completed: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_deleted: bool,
    #[serde(default)]
    pub is_just_upload: Option<bool>,
    #[serde(default)]
    pub is_work_done: Option<bool>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub check_marks: Option<Vec<CheckMark>>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl WorkRequest {
    pub fn just_upload(&self) -> bool {
        self.is_just_upload.unwrap_or(false)
    }

    pub fn work_done(&self) -> bool {
        self.is_work_done.unwrap_or(false)
    }

    /// Neither completed nor deleted.
    pub fn is_active(&self) -> bool {
        !self.completed && !self.is_deleted
    }

    /// Time the job was completed, falling back to creation time.
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    pub fn creator_name(&self) -> Option<&str> {
        self.creator.as_deref().filter(|c| !c.is_empty())
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|v| v.unwrap_or(false))
}

/// Image bytes attached to a create or edit.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Builds an upload, guessing the MIME type from the file extension.
    pub fn from_file_name(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            filename,
            content_type,
            bytes,
        }
    }

    pub fn ensure_image(&self) -> Result<(), ValidationError> {
        if self.content_type.starts_with("image/") {
            Ok(())
        } else {
            Err(ValidationError::NotAnImage {
                filename: self.filename.clone(),
                content_type: self.content_type.clone(),
            })
        }
    }
}

/// Form input for creating or editing a request.
#[derive(Debug, Clone, Default)]
pub struct RequestDraft {
    pub company: String,
    pub program: String,
    pub pickup_date: Option<NaiveDate>,
    pub note: String,
    /// Previously uploaded image to keep when no new image is attached.
    pub image_url: Option<String>,
    pub image: Option<ImageUpload>,
    pub is_urgent: bool,
    pub is_just_upload: bool,
    pub creator: String,
}

impl RequestDraft {
    pub fn new(company: impl Into<String>, program: impl Into<String>, pickup_date: NaiveDate) -> Self {
        Self {
            company: company.into(),
            program: program.into(),
            pickup_date: Some(pickup_date),
            ..Default::default()
        }
    }

    /// Draft pre-filled from an existing row, for edits.
    pub fn from_request(row: &WorkRequest) -> Self {
        Self {
            company: row.company.clone(),
            program: row.program.clone(),
            pickup_date: Some(row.pickup_date),
            note: row.note.clone().unwrap_or_default(),
            image_url: row.image_url.clone(),
            image: None,
            is_urgent: row.is_urgent,
            is_just_upload: row.just_upload(),
            creator: row.creator.clone().unwrap_or_default(),
        }
    }

    /// Checks required fields and the creator roster.
    ///
    /// An empty creator is allowed; a non-empty one must be on the roster
    /// unless the roster itself is empty.
    pub fn validate(&self, creators: &[String]) -> Result<NaiveDate, ValidationError> {
        if self.company.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "company" });
        }
        if self.program.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "program" });
        }
        let pickup_date = self
            .pickup_date
            .ok_or(ValidationError::MissingField { field: "pickup_date" })?;

        if !self.creator.is_empty()
            && !creators.is_empty()
            && !creators.iter().any(|c| c == &self.creator)
        {
            return Err(ValidationError::UnknownCreator(self.creator.clone()));
        }

        if let Some(image) = &self.image {
            image.ensure_image()?;
        }

        Ok(pickup_date)
    }
}

/// Insert payload for the `request` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewWorkRequest {
    pub company: String,
    pub program: String,
    pub pickup_date: NaiveDate,
    pub note: String,
    pub image_url: Option<String>,
    pub is_urgent: bool,
    pub completed: bool,
    pub is_deleted: bool,
    pub is_just_upload: bool,
    pub creator: String,
}

impl NewWorkRequest {
    pub fn from_draft(draft: &RequestDraft, pickup_date: NaiveDate, image_url: Option<String>) -> Self {
        Self {
            company: draft.company.clone(),
            program: draft.program.clone(),
            pickup_date,
            note: draft.note.clone(),
            image_url,
            is_urgent: draft.is_urgent,
            completed: false,
            is_deleted: false,
            is_just_upload: draft.is_just_upload,
            creator: draft.creator.clone(),
        }
    }
}

/// Field-subset update by id. Unset fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// `Some(None)` clears the image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_urgent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_just_upload: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_work_done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_marks: Option<Vec<CheckMark>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RequestPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Lenient timestamp parsing for store columns with or without an offset.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", s)))
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => parse(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", s))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deserialize_store_row_with_nulls() {
        let json = r#"{
            "id": 7,
            "company": "ACME",
            "program": "Banner",
            "pickup_date": "2026-10-16",
            "note": null,
            "image_url": null,
            "is_urgent": null,
            "completed": false,
            "is_deleted": false,
            "created_at": "2026-10-15T23:10:00.123456+00:00",
            "updated_at": null
        }"#;
        let row: WorkRequest = serde_json::from_str(json).unwrap();
        assert_eq!(row.id, 7);
        assert!(!row.is_urgent);
        assert!(!row.just_upload());
        assert_eq!(row.updated_at, None);
        assert_eq!(row.pickup_date, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
    }

    #[test]
    fn test_timestamp_without_offset_is_utc() {
        let parsed = timestamp::parse("2026-10-15T23:10:00.5").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 10, 15, 23, 10, 0).unwrap() + chrono::Duration::milliseconds(500));
        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn test_draft_requires_fields() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let mut draft = RequestDraft::new("ACME", "", date);
        assert_eq!(
            draft.validate(&[]),
            Err(ValidationError::MissingField { field: "program" })
        );

        draft.program = "Banner".to_string();
        draft.pickup_date = None;
        assert_eq!(
            draft.validate(&[]),
            Err(ValidationError::MissingField { field: "pickup_date" })
        );
    }

    #[test]
    fn test_draft_rejects_unknown_creator() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let roster = vec!["김한별".to_string()];
        let mut draft = RequestDraft::new("ACME", "Banner", date);
        assert!(draft.validate(&roster).is_ok());

        draft.creator = "김한별".to_string();
        assert!(draft.validate(&roster).is_ok());

        draft.creator = "nobody".to_string();
        assert_eq!(
            draft.validate(&roster),
            Err(ValidationError::UnknownCreator("nobody".to_string()))
        );
    }

    #[test]
    fn test_image_upload_mime_check() {
        let png = ImageUpload::from_file_name("My Scan.png", vec![1, 2, 3]);
        assert_eq!(png.content_type, "image/png");
        assert!(png.ensure_image().is_ok());

        let pdf = ImageUpload::from_file_name("order.pdf", vec![]);
        assert!(matches!(pdf.ensure_image(), Err(ValidationError::NotAnImage { .. })));
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = RequestPatch {
            completed: Some(true),
            is_urgent: Some(false),
            image_url: Some(None),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["completed"], true);
        assert!(obj["image_url"].is_null());
        assert!(RequestPatch::default().is_empty());
    }
}
