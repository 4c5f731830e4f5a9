//! Request repository: CRUD operations for the `request` table.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::{ToSql, Type};
use rusqlite::{params, Row};

use super::Database;
use crate::gateway::GatewayError;
use crate::model::{timestamp, CheckMark, NewWorkRequest, RequestPatch, WorkRequest};

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub(crate) fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn get_timestamp(row: &Row<'_>, name: &str) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    let idx = row.as_ref().column_index(name)?;
    match row.get::<_, Option<String>>(idx)? {
        Some(s) => timestamp::parse(&s)
            .map(Some)
            .ok_or_else(|| conversion_error(idx, format!("invalid timestamp '{}'", s))),
        None => Ok(None),
    }
}

fn row_to_request(row: &Row<'_>) -> Result<WorkRequest, rusqlite::Error> {
    let pickup_idx = row.as_ref().column_index("pickup_date")?;
    let pickup_raw: String = row.get(pickup_idx)?;
    let pickup_date = NaiveDate::parse_from_str(&pickup_raw, "%Y-%m-%d")
        .map_err(|e| conversion_error(pickup_idx, format!("invalid pickup_date '{}': {}", pickup_raw, e)))?;

    let marks_idx = row.as_ref().column_index("check_marks")?;
    let check_marks = match row.get::<_, Option<String>>(marks_idx)? {
        Some(json) => Some(
            serde_json::from_str::<Vec<CheckMark>>(&json)
                .map_err(|e| conversion_error(marks_idx, e.to_string()))?,
        ),
        None => None,
    };

    let created_at = get_timestamp(row, "created_at")?
        .ok_or_else(|| rusqlite::Error::InvalidColumnType(0, "created_at".to_string(), Type::Null))?;

    Ok(WorkRequest {
        id: row.get("id")?,
        company: row.get("company")?,
        program: row.get("program")?,
        pickup_date,
        note: row.get("note")?,
        image_url: row.get("image_url")?,
        is_urgent: row.get("is_urgent")?,
        completed: row.get("completed")?,
        is_deleted: row.get("is_deleted")?,
        is_just_upload: row.get("is_just_upload")?,
        is_work_done: row.get("is_work_done")?,
        creator: row.get("creator")?,
        check_marks,
        created_at,
        updated_at: get_timestamp(row, "updated_at")?,
        deleted_at: get_timestamp(row, "deleted_at")?,
    })
}

/// Inserts a new row stamped with `created_at` and returns it.
pub fn insert(
    db: &Database,
    row: &NewWorkRequest,
    created_at: DateTime<Utc>,
) -> Result<WorkRequest, GatewayError> {
    let id = db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO request (company, program, pickup_date, note, image_url, is_urgent,
             completed, is_deleted, is_just_upload, creator, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                row.company,
                row.program,
                row.pickup_date.format("%Y-%m-%d").to_string(),
                row.note,
                row.image_url,
                row.is_urgent,
                row.completed,
                row.is_deleted,
                row.is_just_upload,
                row.creator,
                format_timestamp(created_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })?;

    find_by_id(db, id)?.ok_or(GatewayError::UnexpectedResponse {
        operation: "insert",
        reason: format!("row {} vanished after insert", id),
    })
}

/// Writes a full row, keeping its id and timestamps. Existing ids are replaced.
pub fn import(db: &Database, row: &WorkRequest) -> Result<(), GatewayError> {
    let check_marks = row
        .check_marks
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    db.with_conn(|conn| {
        conn.execute(
            "INSERT OR REPLACE INTO request (id, company, program, pickup_date, note, image_url,
             is_urgent, completed, is_deleted, is_just_upload, is_work_done, creator,
             check_marks, created_at, updated_at, deleted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                row.id,
                row.company,
                row.program,
                row.pickup_date.format("%Y-%m-%d").to_string(),
                row.note,
                row.image_url,
                row.is_urgent,
                row.completed,
                row.is_deleted,
                row.is_just_upload,
                row.is_work_done,
                row.creator,
                check_marks,
                format_timestamp(row.created_at),
                row.updated_at.map(format_timestamp),
                row.deleted_at.map(format_timestamp),
            ],
        )?;
        Ok(())
    })
}

/// Applies a field-subset update. Returns the number of rows touched.
pub fn update(db: &Database, id: i64, patch: &RequestPatch) -> Result<usize, GatewayError> {
    let mut assignments = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    let mut set = |column: &str, value: Box<dyn ToSql>| {
        values.push(value);
        assignments.push(format!("{} = ?{}", column, values.len()));
    };

    if let Some(v) = &patch.company {
        set("company", Box::new(v.clone()));
    }
    if let Some(v) = &patch.program {
        set("program", Box::new(v.clone()));
    }
    if let Some(v) = patch.pickup_date {
        set("pickup_date", Box::new(v.format("%Y-%m-%d").to_string()));
    }
    if let Some(v) = &patch.note {
        set("note", Box::new(v.clone()));
    }
    if let Some(v) = &patch.image_url {
        set("image_url", Box::new(v.clone()));
    }
    if let Some(v) = patch.is_urgent {
        set("is_urgent", Box::new(v));
    }
    if let Some(v) = patch.completed {
        set("completed", Box::new(v));
    }
    if let Some(v) = patch.is_deleted {
        set("is_deleted", Box::new(v));
    }
    if let Some(v) = patch.is_just_upload {
        set("is_just_upload", Box::new(v));
    }
    if let Some(v) = patch.is_work_done {
        set("is_work_done", Box::new(v));
    }
    if let Some(v) = &patch.creator {
        set("creator", Box::new(v.clone()));
    }
    if let Some(v) = &patch.check_marks {
        set("check_marks", Box::new(serde_json::to_string(v)?));
    }
    if let Some(v) = patch.updated_at {
        set("updated_at", Box::new(format_timestamp(v)));
    }
    if let Some(v) = patch.deleted_at {
        set("deleted_at", Box::new(format_timestamp(v)));
    }

    if assignments.is_empty() {
        return Ok(0);
    }

    values.push(Box::new(id));
    let sql = format!(
        "UPDATE request SET {} WHERE id = ?{}",
        assignments.join(", "),
        values.len()
    );

    db.with_conn(|conn| {
        let params_ref: Vec<&dyn ToSql> = values.iter().map(|p| p.as_ref()).collect();
        Ok(conn.execute(&sql, params_ref.as_slice())?)
    })
}

/// Deletes a row by id. Returns the number of rows removed (0 if absent).
pub fn delete(db: &Database, id: i64) -> Result<usize, GatewayError> {
    db.with_conn(|conn| Ok(conn.execute("DELETE FROM request WHERE id = ?1", params![id])?))
}

/// Finds a row by its id.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<WorkRequest>, GatewayError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM request WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], row_to_request)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(GatewayError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// All rows in snapshot order.
pub fn list_all(db: &Database) -> Result<Vec<WorkRequest>, GatewayError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM request ORDER BY is_deleted ASC, is_urgent DESC, created_at DESC",
        )?;
        let rows = stmt
            .query_map([], row_to_request)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
