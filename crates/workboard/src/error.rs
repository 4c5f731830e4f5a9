use std::path::PathBuf;
use thiserror::Error;

use crate::board::Bucket;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Gateway(#[from] crate::gateway::GatewayError),

    #[error("Gate error: {0}")]
    Gate(#[from] GateError),

    #[error("Secret error: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Could not determine the home directory")]
    NoHomeDir,
}

/// Client-side failures detected before any write is issued.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("업체명, 프로그램명, 픽업일은 필수입니다. (missing: {field})")]
    MissingField { field: &'static str },

    #[error("Unknown creator '{0}'")]
    UnknownCreator(String),

    #[error("Not an image file: '{filename}' ({content_type})")]
    NotAnImage {
        filename: String,
        content_type: String,
    },

    #[error("Request {0} not found")]
    NotFound(i64),

    #[error("Request {id} is in the {bucket} bucket; {operation} is not allowed")]
    WrongBucket {
        id: i64,
        bucket: Bucket,
        operation: &'static str,
    },

    #[error("Request {0} is not in the just-upload holding area")]
    NotJustUpload(i64),
}

#[derive(Error, Debug)]
pub enum GateError {
    #[error("비밀번호가 올바르지 않습니다.")]
    WrongPassword,

    #[error("Failed to access session file '{path}': {source}")]
    SessionFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Board is locked; run `workboard login` first")]
    Locked,
}

pub type Result<T> = std::result::Result<T, BoardError>;
