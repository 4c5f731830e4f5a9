pub mod loader;
pub mod schema;

pub use loader::{default_config_path, load_config, load_config_from_str, load_or_default};
pub use schema::{
    default_creators, BackendConfig, BoardConfig, GateConfig, RetentionConfig, SqliteConfig,
    SupabaseConfig, DEFAULT_LOCAL_PUBLIC_BASE_URL,
};
