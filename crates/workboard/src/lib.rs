pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod report;
pub mod sanitize;
pub mod secrets;
pub mod service;
pub mod sync;

pub use board::{bucket_of, partition, BoardView, Bucket, PickupLabel};
pub use config::{load_config, BoardConfig};
pub use error::{BoardError, ConfigError, GateError, Result, ValidationError};
pub use gate::PasswordGate;
pub use gateway::{GatewayError, GatewayHandle, RecordGateway, SqliteGateway, SupabaseGateway};
pub use model::{CheckMark, ImageUpload, RequestDraft, RequestPatch, WorkRequest};
pub use secrets::{resolve_secret, SecretError};
pub use service::{BoardCommand, BoardService, CommandOutcome, Confirm};
pub use sync::{BoardFetcher, Snapshot, SyncScheduler};
