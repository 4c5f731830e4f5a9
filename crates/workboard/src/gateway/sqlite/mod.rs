//! Self-hosted record store on SQLite.
//!
//! Uses rusqlite with a thread-safe `Database` handle. All access is
//! serialized through a `Mutex<Connection>`; every statement is a single
//! short write or read, so the async gateway methods call it inline.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Connection;

use super::{GatewayError, RecordGateway, IMAGE_BUCKET};
use crate::config::SqliteConfig;
use crate::model::{NewWorkRequest, RequestPatch, WorkRequest};

pub mod migrations;
pub mod object_repo;
pub mod request_repo;

/// Thread-safe database handle wrapping a single rusqlite connection.
///
/// Cloning is cheap (inner `Arc`).
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database at the given path and runs all
    /// pending migrations.
    pub fn open(path: &Path) -> Result<Self, GatewayError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GatewayError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        migrations::run_all(&conn)?;

        log::info!("Local store opened at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database. Runs all migrations.
    pub fn open_in_memory() -> Result<Self, GatewayError> {
        let conn = Connection::open_in_memory()?;
        migrations::run_all(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Provides locked access to the underlying connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, GatewayError>
    where
        F: FnOnce(&Connection) -> Result<T, GatewayError>,
    {
        let conn = self.conn.lock().map_err(|_| GatewayError::LockPoisoned)?;
        f(&conn)
    }
}

/// Returns the canonical local store path: `~/.workboard/data/workboard.db`.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".workboard").join("data").join("workboard.db"))
}

/// Gateway over a local SQLite file (or memory, for tests).
pub struct SqliteGateway {
    db: Database,
    bucket: String,
    public_base_url: String,
    label: String,
}

impl SqliteGateway {
    pub fn new(db: Database, public_base_url: &str, label: impl Into<String>) -> Self {
        Self {
            db,
            bucket: IMAGE_BUCKET.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            label: label.into(),
        }
    }

    pub fn open(path: &Path, public_base_url: &str) -> Result<Self, GatewayError> {
        let db = Database::open(path)?;
        Ok(Self::new(
            db,
            public_base_url,
            format!("sqlite {}", crate::sanitize::redact_path(path)),
        ))
    }

    pub fn open_in_memory() -> Result<Self, GatewayError> {
        Ok(Self::new(
            Database::open_in_memory()?,
            crate::config::DEFAULT_LOCAL_PUBLIC_BASE_URL,
            "sqlite :memory:",
        ))
    }

    pub fn from_config(cfg: &SqliteConfig) -> Result<Self, GatewayError> {
        let path = match &cfg.path {
            Some(p) => PathBuf::from(crate::secrets::expand_home(p)),
            None => default_database_path().ok_or_else(|| GatewayError::Io {
                path: PathBuf::from("~/.workboard/data/workboard.db"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no home directory"),
            })?,
        };
        Self::open(&path, &cfg.public_base_url)
    }

    /// Writes rows verbatim, keeping ids and timestamps.
    pub fn import(&self, rows: &[WorkRequest]) -> Result<usize, GatewayError> {
        for row in rows {
            request_repo::import(&self.db, row)?;
        }
        Ok(rows.len())
    }

    /// Reads an uploaded object back from the bucket.
    pub fn object(&self, name: &str) -> Result<Option<object_repo::StoredObject>, GatewayError> {
        object_repo::get(&self.db, &self.bucket, name)
    }
}

#[async_trait]
impl RecordGateway for SqliteGateway {
    async fn fetch_all(&self) -> Result<Vec<WorkRequest>, GatewayError> {
        request_repo::list_all(&self.db)
    }

    async fn insert(&self, row: &NewWorkRequest) -> Result<WorkRequest, GatewayError> {
        request_repo::insert(&self.db, row, Utc::now())
    }

    async fn update(&self, id: i64, patch: &RequestPatch) -> Result<(), GatewayError> {
        let touched = request_repo::update(&self.db, id, patch)?;
        if touched == 0 {
            log::debug!("Update of request {} matched no rows", id);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), GatewayError> {
        request_repo::delete(&self.db, id)?;
        Ok(())
    }

    async fn upload_object(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), GatewayError> {
        object_repo::put(&self.db, &self.bucket, name, content_type, &bytes, Utc::now())
    }

    fn public_url(&self, name: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, self.bucket, name)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
