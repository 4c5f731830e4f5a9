//! Plain-text rendering of the board for the terminal.

use chrono::NaiveDate;

use crate::board::{days_left, BoardView, Bucket, PickupLabel};
use crate::model::WorkRequest;

fn bucket_title(bucket: Bucket) -> &'static str {
    match bucket {
        Bucket::InProgress => "진행 중",
        Bucket::Completed => "완료",
        Bucket::Deleted => "삭제됨",
        Bucket::JustUpload => "업로드만",
    }
}

pub fn card_line(row: &WorkRequest, bucket: Bucket, today: NaiveDate) -> String {
    let mut line = format!("#{:<5} {} / {}", row.id, row.company, row.program);

    match bucket {
        Bucket::InProgress => line.push_str(&format!(
            "  [{}] 픽업 {} (daysLeft {})",
            PickupLabel::for_request(row, today),
            row.pickup_date,
            days_left(row.pickup_date, today)
        )),
        Bucket::Completed => line.push_str(&format!(
            "  완료 {}",
            row.completed_at().format("%Y-%m-%d %H:%M")
        )),
        Bucket::Deleted => {
            if let Some(at) = row.deleted_at {
                line.push_str(&format!("  삭제 {}", at.format("%Y-%m-%d %H:%M")));
            }
        }
        Bucket::JustUpload => line.push_str(&format!("  픽업 {}", row.pickup_date)),
    }

    if row.work_done() {
        line.push_str("  ✓작업완료");
    }
    if let Some(creator) = row.creator_name() {
        line.push_str(&format!("  ({})", creator));
    }
    if row.image_url.is_some() {
        line.push_str("  [이미지]");
    }
    if let Some(note) = row.note.as_deref().filter(|n| !n.is_empty()) {
        line.push_str(&format!("\n         {}", note));
    }
    line
}

/// Renders the selected buckets, or all four.
pub fn render_board(view: &BoardView, only: Option<Bucket>, today: NaiveDate) -> String {
    let buckets = match only {
        Some(bucket) => vec![bucket],
        None => vec![
            Bucket::InProgress,
            Bucket::JustUpload,
            Bucket::Completed,
            Bucket::Deleted,
        ],
    };

    let mut out = String::new();
    for bucket in buckets {
        let rows = view.bucket(bucket);
        out.push_str(&format!("== {} ({}) ==\n", bucket_title(bucket), rows.len()));
        for row in rows {
            out.push_str(&card_line(row, bucket, today));
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row() -> WorkRequest {
        WorkRequest {
            id: 3,
            company: "ACME".to_string(),
            program: "Banner".to_string(),
            pickup_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            note: Some("matte".to_string()),
            image_url: None,
            is_urgent: false,
            completed: false,
            is_deleted: false,
            is_just_upload: None,
            is_work_done: None,
            creator: Some("정수원".to_string()),
            check_marks: None,
            created_at: Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap(),
            updated_at: None,
            deleted_at: None,
        }
    }

    #[test]
    fn test_in_progress_card_shows_label() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let line = card_line(&row(), Bucket::InProgress, today);
        assert!(line.contains("[오늘]"));
        assert!(line.contains("daysLeft 0"));
        assert!(line.contains("(정수원)"));
        assert!(line.contains("matte"));
    }

    #[test]
    fn test_render_single_bucket() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let view = BoardView {
            in_progress: vec![row()],
            ..Default::default()
        };
        let out = render_board(&view, Some(Bucket::InProgress), today);
        assert!(out.starts_with("== 진행 중 (1) =="));
        assert!(!out.contains("완료 ("));
    }
}
