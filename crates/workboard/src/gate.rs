//! Shared-password gate in front of the board.
//!
//! A successful login writes the session expiry (unix millis) to a session
//! file; later invocations are unlocked until that time passes.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::config::GateConfig;
use crate::error::{BoardError, GateError};
use crate::secrets::SecretSource;

/// Returns `~/.workboard/session`.
pub fn default_session_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".workboard").join("session"))
}

pub struct PasswordGate {
    password: Option<SecretString>,
    session_path: PathBuf,
    session_length: Duration,
}

impl PasswordGate {
    pub fn new(password: Option<SecretString>, session_path: PathBuf, session_hours: u32) -> Self {
        Self {
            password,
            session_path,
            session_length: Duration::hours(i64::from(session_hours)),
        }
    }

    pub fn from_config(cfg: &GateConfig, session_path: PathBuf) -> Result<Self, BoardError> {
        let password = SecretSource::new(
            cfg.password.as_deref(),
            cfg.password_file.as_deref(),
            cfg.password_env_var.as_deref(),
        )
        .resolve_optional()?;
        if password.is_none() {
            log::warn!("No board password configured; the gate is open");
        }
        Ok(Self::new(password, session_path, cfg.session_hours))
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    /// True when no password is configured.
    pub fn is_open(&self) -> bool {
        self.password.is_none()
    }

    /// Checks the password and starts a session. Returns the expiry.
    pub fn unlock(&self, attempt: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, GateError> {
        if let Some(password) = &self.password {
            if password.expose_secret() != attempt {
                log::warn!("Rejected board login attempt");
                return Err(GateError::WrongPassword);
            }
        }

        let expires_at = now + self.session_length;
        if let Some(parent) = self.session_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.session_error(e))?;
        }
        std::fs::write(&self.session_path, expires_at.timestamp_millis().to_string())
            .map_err(|e| self.session_error(e))?;

        log::info!("Board unlocked until {}", expires_at.to_rfc3339());
        Ok(expires_at)
    }

    /// Session expiry, if a readable session file exists.
    pub fn session_expiry(&self) -> Result<Option<DateTime<Utc>>, GateError> {
        let content = match std::fs::read_to_string(&self.session_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.session_error(e)),
        };

        match content.trim().parse::<i64>() {
            Ok(millis) => Ok(DateTime::from_timestamp_millis(millis)),
            Err(_) => {
                log::warn!("Ignoring malformed session file");
                Ok(None)
            }
        }
    }

    pub fn is_unlocked(&self, now: DateTime<Utc>) -> Result<bool, GateError> {
        if self.is_open() {
            return Ok(true);
        }
        Ok(matches!(self.session_expiry()?, Some(expiry) if expiry > now))
    }

    pub fn ensure_unlocked(&self, now: DateTime<Utc>) -> Result<(), GateError> {
        if self.is_unlocked(now)? {
            Ok(())
        } else {
            Err(GateError::Locked)
        }
    }

    /// Ends the session. A missing session file is fine.
    pub fn lock(&self) -> Result<(), GateError> {
        match std::fs::remove_file(&self.session_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.session_error(e)),
        }
    }

    fn session_error(&self, source: std::io::Error) -> GateError {
        GateError::SessionFile {
            path: self.session_path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn gate(dir: &TempDir) -> PasswordGate {
        PasswordGate::new(
            Some(SecretString::from("sign123".to_string())),
            dir.path().join("state").join("session"),
            24,
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_locked_without_session() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        assert!(!gate.is_unlocked(now()).unwrap());
        assert!(matches!(gate.ensure_unlocked(now()), Err(GateError::Locked)));
    }

    #[test]
    fn test_wrong_password() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        assert!(matches!(
            gate.unlock("nope", now()),
            Err(GateError::WrongPassword)
        ));
        assert!(!gate.session_path().exists());
    }

    #[test]
    fn test_session_expires() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        let expiry = gate.unlock("sign123", now()).unwrap();
        assert_eq!(expiry, now() + Duration::hours(24));
        assert!(gate.is_unlocked(now() + Duration::hours(23)).unwrap());
        assert!(!gate.is_unlocked(now() + Duration::hours(24)).unwrap());

        let stored = std::fs::read_to_string(gate.session_path()).unwrap();
        assert_eq!(stored, expiry.timestamp_millis().to_string());
    }

    #[test]
    fn test_lock_removes_session() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        gate.unlock("sign123", now()).unwrap();
        gate.lock().unwrap();
        assert!(!gate.is_unlocked(now()).unwrap());
        gate.lock().unwrap();
    }

    #[test]
    fn test_malformed_session_is_locked() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        std::fs::create_dir_all(gate.session_path().parent().unwrap()).unwrap();
        std::fs::write(gate.session_path(), "tomorrow").unwrap();
        assert!(!gate.is_unlocked(now()).unwrap());
    }

    #[test]
    fn test_open_gate() {
        let dir = TempDir::new().unwrap();
        let gate = PasswordGate::from_config(&GateConfig::default(), dir.path().join("session")).unwrap();
        assert!(gate.is_open());
        assert!(gate.is_unlocked(now()).unwrap());
    }
}
