//! Hosted record store over PostgREST and the storage REST API.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};

use super::{GatewayError, RecordGateway};
use crate::config::SupabaseConfig;
use crate::error::BoardError;
use crate::model::{NewWorkRequest, RequestPatch, WorkRequest};
use crate::sanitize::{redact_key, redact_url};
use crate::secrets::resolve_secret;

/// Store-side ordering hint for full snapshots.
const SNAPSHOT_ORDER: &str = "is_deleted.asc,is_urgent.desc,created_at.desc";

/// Maximum length for error bodies kept in messages.
const MAX_ERROR_BODY_LENGTH: usize = 200;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn truncate_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        let cut: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... (truncated)", cut)
    } else {
        body.to_string()
    }
}

/// Returns the response if its status is a success, otherwise a
/// [`GatewayError::Status`] carrying the (truncated) body.
async fn ensure_success(response: Response, operation: &'static str) -> Result<Response, GatewayError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Status {
        operation,
        status,
        body: truncate_body(&body),
    })
}

/// PostgREST-backed gateway.
pub struct SupabaseGateway {
    client: Client,
    base_url: String,
    anon_key: SecretString,
    table: String,
    bucket: String,
}

impl SupabaseGateway {
    pub fn new(
        base_url: &str,
        anon_key: SecretString,
        table: &str,
        bucket: &str,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            table: table.to_string(),
            bucket: bucket.to_string(),
        })
    }

    pub fn from_config(cfg: &SupabaseConfig) -> Result<Self, BoardError> {
        let anon_key = resolve_secret(
            cfg.anon_key.as_deref(),
            cfg.anon_key_file.as_deref(),
            cfg.anon_key_env_var.as_deref(),
        )?;
        Ok(Self::new(&cfg.url, anon_key, &cfg.table, &cfg.bucket)?)
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn object_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            urlencoding::encode(name)
        )
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.anon_key.expose_secret();
        builder.header("apikey", key).bearer_auth(key)
    }

    fn id_filter(id: i64) -> [(&'static str, String); 1] {
        [("id", format!("eq.{}", id))]
    }
}

#[async_trait]
impl RecordGateway for SupabaseGateway {
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    async fn fetch_all(&self) -> Result<Vec<WorkRequest>, GatewayError> {
        let response = self
            .authed(self.client.get(self.table_url()))
            .query(&[("select", "*"), ("order", SNAPSHOT_ORDER)])
            .send()
            .await?;
        let response = ensure_success(response, "fetch").await?;
        let rows: Vec<WorkRequest> = response.json().await?;
        debug!("Fetched {} rows from {}", rows.len(), self.table);
        Ok(rows)
    }

    #[tracing::instrument(skip(self, row), fields(table = %self.table))]
    async fn insert(&self, row: &NewWorkRequest) -> Result<WorkRequest, GatewayError> {
        let response = self
            .authed(self.client.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;
        let response = ensure_success(response, "insert").await?;
        let mut rows: Vec<WorkRequest> = response.json().await?;
        rows.pop().ok_or(GatewayError::UnexpectedResponse {
            operation: "insert",
            reason: "store returned no rows".to_string(),
        })
    }

    #[tracing::instrument(skip(self, patch), fields(table = %self.table))]
    async fn update(&self, id: i64, patch: &RequestPatch) -> Result<(), GatewayError> {
        if patch.is_empty() {
            return Ok(());
        }
        let response = self
            .authed(self.client.patch(self.table_url()))
            .header("Prefer", "return=minimal")
            .query(&Self::id_filter(id))
            .json(patch)
            .send()
            .await?;
        ensure_success(response, "update").await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(table = %self.table))]
    async fn delete(&self, id: i64) -> Result<(), GatewayError> {
        // PostgREST answers 204 whether or not a row matched.
        let response = self
            .authed(self.client.delete(self.table_url()))
            .query(&Self::id_filter(id))
            .send()
            .await?;
        ensure_success(response, "delete").await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, bytes), fields(bucket = %self.bucket, size = bytes.len()))]
    async fn upload_object(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), GatewayError> {
        let response = self
            .authed(self.client.post(self.object_url(name)))
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        ensure_success(response, "upload").await?;
        Ok(())
    }

    fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, name
        )
    }

    fn describe(&self) -> String {
        format!(
            "supabase {} (table {}, key {})",
            redact_url(&self.base_url),
            self.table,
            redact_key(self.anon_key.expose_secret())
        )
    }
}
