//! Object repository: image bucket contents for the local store.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::request_repo::format_timestamp;
use super::Database;
use crate::gateway::GatewayError;

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Stores an object. Fails if the name is already taken in the bucket.
pub fn put(
    db: &Database,
    bucket: &str,
    name: &str,
    content_type: &str,
    bytes: &[u8],
    created_at: DateTime<Utc>,
) -> Result<(), GatewayError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO objects (bucket, name, content_type, bytes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![bucket, name, content_type, bytes, format_timestamp(created_at)],
        )?;
        Ok(())
    })
}

/// Reads an object back.
pub fn get(db: &Database, bucket: &str, name: &str) -> Result<Option<StoredObject>, GatewayError> {
    db.with_conn(|conn| {
        let object = conn
            .query_row(
                "SELECT content_type, bytes FROM objects WHERE bucket = ?1 AND name = ?2",
                params![bucket, name],
                |r| {
                    Ok(StoredObject {
                        content_type: r.get(0)?,
                        bytes: r.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(object)
    })
}
