use serde::{Deserialize, Serialize};

use crate::board::DEFAULT_DELETED_DISPLAY_CAP;
use crate::gateway::{IMAGE_BUCKET, REQUEST_TABLE};

/// Base URL used for object links when the store is the local SQLite file.
pub const DEFAULT_LOCAL_PUBLIC_BASE_URL: &str = "local://objects";

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_COMPLETED_CAP: usize = 100;
pub const DEFAULT_DELETED_CAP: usize = 10;
pub const DEFAULT_REPORT_UTC_OFFSET_HOURS: i32 = 9;
pub const DEFAULT_SESSION_HOURS: u32 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfig {
    pub version: String,
    pub backend: BackendConfig,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default = "default_report_utc_offset_hours")]
    pub report_utc_offset_hours: i32,
    #[serde(default = "default_creators")]
    pub creators: Vec<String>,
    #[serde(default)]
    pub gate: GateConfig,
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_report_utc_offset_hours() -> i32 {
    DEFAULT_REPORT_UTC_OFFSET_HOURS
}

/// The shop's staff roster.
pub fn default_creators() -> Vec<String> {
    ["박혜경", "김한별", "장석환", "정수원"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl BoardConfig {
    /// Config used when no file exists: local SQLite store at the default
    /// path, everything else at its default.
    pub fn local_default() -> Self {
        Self {
            version: "1.0".to_string(),
            backend: BackendConfig::Sqlite(SqliteConfig::default()),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            retention: RetentionConfig::default(),
            report_utc_offset_hours: DEFAULT_REPORT_UTC_OFFSET_HOURS,
            creators: default_creators(),
            gate: GateConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    Supabase(SupabaseConfig),
    Sqlite(SqliteConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupabaseConfig {
    pub url: String,
    #[serde(default)]
    pub anon_key: Option<String>,
    #[serde(default)]
    pub anon_key_file: Option<String>,
    #[serde(default)]
    pub anon_key_env_var: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

fn default_table() -> String {
    REQUEST_TABLE.to_string()
}

fn default_bucket() -> String {
    IMAGE_BUCKET.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqliteConfig {
    /// Database file; `~/.workboard/data/workboard.db` when unset.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_public_base_url() -> String {
    DEFAULT_LOCAL_PUBLIC_BASE_URL.to_string()
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: None,
            public_base_url: default_public_base_url(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RetentionConfig {
    #[serde(default = "default_completed_cap")]
    pub completed_cap: usize,
    #[serde(default = "default_deleted_cap")]
    pub deleted_cap: usize,
    #[serde(default = "default_deleted_display_cap")]
    pub deleted_display_cap: usize,
}

fn default_completed_cap() -> usize {
    DEFAULT_COMPLETED_CAP
}

fn default_deleted_cap() -> usize {
    DEFAULT_DELETED_CAP
}

fn default_deleted_display_cap() -> usize {
    DEFAULT_DELETED_DISPLAY_CAP
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            completed_cap: DEFAULT_COMPLETED_CAP,
            deleted_cap: DEFAULT_DELETED_CAP,
            deleted_display_cap: DEFAULT_DELETED_DISPLAY_CAP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateConfig {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_file: Option<String>,
    #[serde(default)]
    pub password_env_var: Option<String>,
    #[serde(default = "default_session_hours")]
    pub session_hours: u32,
}

fn default_session_hours() -> u32 {
    DEFAULT_SESSION_HOURS
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            password: None,
            password_file: None,
            password_env_var: None,
            session_hours: DEFAULT_SESSION_HOURS,
        }
    }
}
