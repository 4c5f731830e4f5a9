//! Resolution of the store API key and the shared board password.
//!
//! A secret may be configured three ways, tried in this order:
//!
//! 1. **Inline value** in the config file (handy for a single shop PC)
//! 2. **File** holding the value (e.g. `anonKeyFile: ~/.workboard/anon.key`)
//! 3. **Environment variable** (e.g. `anonKeyEnvVar: WORKBOARD_ANON_KEY`)

use secrecy::SecretString;
use std::fs;

/// Error type for secret resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source configured (need an inline value, a file or an env var)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Where a secret may come from. Empty strings count as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretSource<'a> {
    pub value: Option<&'a str>,
    pub file: Option<&'a str>,
    pub env_var: Option<&'a str>,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

impl<'a> SecretSource<'a> {
    pub fn new(value: Option<&'a str>, file: Option<&'a str>, env_var: Option<&'a str>) -> Self {
        Self {
            value,
            file,
            env_var,
        }
    }

    pub fn is_configured(&self) -> bool {
        non_empty(self.value).is_some()
            || non_empty(self.file).is_some()
            || non_empty(self.env_var).is_some()
    }

    /// Returns the first configured source's value, trimmed.
    pub fn resolve(&self) -> Result<SecretString> {
        if let Some(value) = non_empty(self.value) {
            return Ok(SecretString::from(value.to_string()));
        }

        if let Some(path) = non_empty(self.file) {
            let expanded = expand_home(path);
            return fs::read_to_string(&expanded)
                .map(|content| SecretString::from(content.trim().to_string()))
                .map_err(|source| SecretError::FileReadError {
                    path: expanded,
                    source,
                });
        }

        if let Some(name) = non_empty(self.env_var) {
            return match std::env::var(name) {
                Ok(value) => Ok(SecretString::from(value.trim().to_string())),
                Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                    name: name.to_string(),
                }),
                Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                    name: name.to_string(),
                }),
            };
        }

        Err(SecretError::NoSourceProvided)
    }

    /// Like [`resolve`](Self::resolve) but `None` when nothing is configured.
    pub fn resolve_optional(&self) -> Result<Option<SecretString>> {
        match self.resolve() {
            Ok(secret) => Ok(Some(secret)),
            Err(SecretError::NoSourceProvided) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Shorthand for `SecretSource::new(..).resolve()`.
pub fn resolve_secret(
    value: Option<&str>,
    file: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    SecretSource::new(value, file, env_var).resolve()
}

/// Expands a leading `~` to the home directory (HOME, then USERPROFILE).
///
/// `~user/path` is not supported.
pub fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
