//! Printable HTML documents: today's work summary and a single manuscript.

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};

use crate::board::local_today;
use crate::model::WorkRequest;

/// Group label for rows without a creator.
pub const UNASSIGNED_CREATOR: &str = "미지정";

const TODAY_STYLE: &str = r#"
    body { font-family: 'Pretendard', 'Noto Sans KR', sans-serif; background: #f8fafc; color: #222; margin: 0; padding: 32px 0; }
    h1 { font-size: 22px; font-weight: 700; margin-bottom: 32px; text-align: center; letter-spacing: -1px; }
    .creator-block { margin-bottom: 40px; background: #fff; border-radius: 18px; box-shadow: 0 2px 12px 0 #0001; padding: 24px 32px; }
    .creator-title { font-size: 18px; font-weight: 600; color: #2563eb; margin-bottom: 18px; letter-spacing: -0.5px; }
    table { width: 100%; border-collapse: separate; border-spacing: 0; background: #f9fafb; border-radius: 12px; overflow: hidden; }
    th, td { padding: 10px 12px; font-size: 14px; text-align: left; }
    th { background: #e0e7ef; font-weight: 700; border-bottom: 2px solid #cbd5e1; }
    td { border-bottom: 1px solid #e5e7eb; }
    @media print { body { background: #fff; padding: 0; } .creator-block { box-shadow: none; padding: 12px 0; } }
"#;

const IMAGE_STYLE: &str = r#"
    body { margin: 0; padding: 20px; display: flex; flex-direction: column; align-items: center; font-family: sans-serif; }
    .header { text-align: center; margin-bottom: 20px; }
    img { max-width: 100%; height: auto; object-fit: contain; }
    @media print { body { padding: 0; } .header { margin-bottom: 10px; } }
"#;

/// Escapes text for HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn offset_for(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
}

/// `2026. 10. 16. 오후 3:04:05`
fn format_upload_time(at: DateTime<FixedOffset>) -> String {
    let (is_pm, hour) = at.hour12();
    format!(
        "{} {} {}:{:02}:{:02}",
        at.format("%Y. %-m. %-d."),
        if is_pm { "오후" } else { "오전" },
        hour,
        at.minute(),
        at.second()
    )
}

/// Non-deleted rows created on `now`'s calendar day at the given UTC offset,
/// grouped by creator in order of first upload.
pub fn todays_work(
    rows: &[WorkRequest],
    now: DateTime<Utc>,
    utc_offset_hours: i32,
) -> Vec<(String, Vec<&WorkRequest>)> {
    let offset = offset_for(utc_offset_hours);
    let today = local_today(now, utc_offset_hours);

    let mut todays: Vec<&WorkRequest> = rows
        .iter()
        .filter(|r| !r.is_deleted && r.created_at.with_timezone(&offset).date_naive() == today)
        .collect();
    todays.sort_by_key(|r| (r.created_at, r.id));

    let mut groups: Vec<(String, Vec<&WorkRequest>)> = Vec::new();
    for row in todays {
        let creator = row.creator_name().unwrap_or(UNASSIGNED_CREATOR);
        match groups.iter_mut().find(|(name, _)| name == creator) {
            Some((_, items)) => items.push(row),
            None => groups.push((creator.to_string(), vec![row])),
        }
    }
    groups
}

pub fn today_work_html(rows: &[WorkRequest], now: DateTime<Utc>, utc_offset_hours: i32) -> String {
    let offset = offset_for(utc_offset_hours);

    let mut html = String::new();
    html.push_str("<html>\n<head>\n<meta charset=\"utf-8\">\n<title>오늘 작업 출력</title>\n");
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", TODAY_STYLE));
    html.push_str("<h1>오늘 작업한 내용 (한국시간)</h1>\n");

    for (creator, items) in todays_work(rows, now, utc_offset_hours) {
        html.push_str("<div class=\"creator-block\">\n");
        html.push_str(&format!(
            "<div class=\"creator-title\">{}</div>\n",
            escape_html(&creator)
        ));
        html.push_str(
            "<table>\n<thead><tr><th>업체명</th><th>프로그램명</th><th>업로드 시간</th><th>완료 여부</th></tr></thead>\n<tbody>\n",
        );
        for item in items {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&item.company),
                escape_html(&item.program),
                format_upload_time(item.created_at.with_timezone(&offset)),
                if item.completed { "완료됨" } else { "아직 완료 안 됨" }
            ));
        }
        html.push_str("</tbody>\n</table>\n</div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

pub fn single_image_html(image_url: &str, company: &str, program: &str) -> String {
    let company = escape_html(company);
    let program = escape_html(program);
    format!(
        "<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{company} - {program} 출력</title>\n<style>{style}</style>\n</head>\n<body>\n\
         <div class=\"header\">\n<h2>{company}</h2>\n<p>{program}</p>\n</div>\n\
         <div class=\"image-container\">\n<img src=\"{url}\" alt=\"{company} - {program}\" />\n</div>\n\
         </body>\n</html>\n",
        company = company,
        program = program,
        style = IMAGE_STYLE,
        url = escape_html(image_url),
    )
}
