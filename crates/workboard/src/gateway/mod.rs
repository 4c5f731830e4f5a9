//! Record store gateway: the `request` table and the `request-images` bucket.
//!
//! The application holds no authoritative state. Every read and write goes
//! through a [`RecordGateway`]; the process builds one [`GatewayHandle`] at
//! start-up and injects it into the fetcher and the mutation service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{BackendConfig, BoardConfig};
use crate::error::BoardError;
use crate::model::{NewWorkRequest, RequestPatch, WorkRequest};

pub mod error;
pub mod sqlite;
pub mod supabase;

pub use error::GatewayError;
pub use sqlite::SqliteGateway;
pub use supabase::SupabaseGateway;

/// Default table holding work requests.
pub const REQUEST_TABLE: &str = "request";

/// Default bucket holding manuscript images.
pub const IMAGE_BUCKET: &str = "request-images";

/// Operations the board needs from its backing store.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// Full table snapshot ordered by `is_deleted` asc, `is_urgent` desc,
    /// `created_at` desc.
    async fn fetch_all(&self) -> Result<Vec<WorkRequest>, GatewayError>;

    /// Inserts a row and returns it with store-assigned id and timestamps.
    async fn insert(&self, row: &NewWorkRequest) -> Result<WorkRequest, GatewayError>;

    /// Field-subset update by id.
    async fn update(&self, id: i64, patch: &RequestPatch) -> Result<(), GatewayError>;

    /// Physical delete by id. Deleting an absent row succeeds.
    async fn delete(&self, id: i64) -> Result<(), GatewayError>;

    /// Stores an object in the image bucket.
    async fn upload_object(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), GatewayError>;

    /// Stable public URL for an uploaded object.
    fn public_url(&self, name: &str) -> String;

    /// Short description safe for logs.
    fn describe(&self) -> String;
}

/// Shared, process-wide store handle.
pub type GatewayHandle = Arc<dyn RecordGateway>;

/// Builds the store handle selected by the configuration.
pub fn connect(config: &BoardConfig) -> Result<GatewayHandle, BoardError> {
    let handle: GatewayHandle = match &config.backend {
        BackendConfig::Supabase(cfg) => Arc::new(SupabaseGateway::from_config(cfg)?),
        BackendConfig::Sqlite(cfg) => Arc::new(SqliteGateway::from_config(cfg)?),
    };
    log::info!("Connected to record store: {}", handle.describe());
    Ok(handle)
}
