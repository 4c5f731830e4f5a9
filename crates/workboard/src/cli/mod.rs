//! Command-line front end: shared context and the subcommand handlers.

pub mod commands;
pub mod render;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::ValueEnum;

use crate::board::{local_today, Bucket};
use crate::config::{default_config_path, load_or_default, BoardConfig};
use crate::error::{BoardError, ConfigError};
use crate::gate::{default_session_path, PasswordGate};
use crate::gateway;
use crate::service::{AlwaysConfirm, BoardService, Confirm};
use crate::sync::BoardFetcher;

pub type CliResult<T = ()> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Everything a subcommand needs, built once from the config file.
pub struct Context {
    pub config: BoardConfig,
    pub gate: PasswordGate,
    pub service: BoardService,
}

impl Context {
    pub fn open(config_path: Option<PathBuf>) -> Result<Self, BoardError> {
        let path = match config_path {
            Some(path) => path,
            None => default_config_path()?,
        };
        let config = load_or_default(&path)?;

        let handle = gateway::connect(&config)?;
        let fetcher = Arc::new(BoardFetcher::new(handle, config.retention));
        let service = BoardService::new(fetcher, config.creators.clone());

        let session_path = default_session_path().ok_or(ConfigError::NoHomeDir)?;
        let gate = PasswordGate::from_config(&config.gate, session_path)?;

        Ok(Self {
            config,
            gate,
            service,
        })
    }

    pub fn fetcher(&self) -> &Arc<BoardFetcher> {
        self.service.fetcher()
    }

    pub fn ensure_unlocked(&self) -> Result<(), BoardError> {
        Ok(self.gate.ensure_unlocked(Utc::now())?)
    }

    /// The shop's current calendar day.
    pub fn today(&self) -> NaiveDate {
        local_today(Utc::now(), self.config.report_utc_offset_hours)
    }
}

/// Asks on the terminal. Any prompt failure counts as "no".
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        inquire::Confirm::new(prompt)
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }
}

/// `--yes` skips the prompt.
pub fn confirmer(yes: bool) -> &'static dyn Confirm {
    if yes {
        &AlwaysConfirm
    } else {
        &PromptConfirm
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BucketArg {
    InProgress,
    Completed,
    Deleted,
    JustUpload,
}

impl From<BucketArg> for Bucket {
    fn from(arg: BucketArg) -> Self {
        match arg {
            BucketArg::InProgress => Bucket::InProgress,
            BucketArg::Completed => Bucket::Completed,
            BucketArg::Deleted => Bucket::Deleted,
            BucketArg::JustUpload => Bucket::JustUpload,
        }
    }
}

/// Parses `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{}': {}", s, e))
}

/// Parses an `x,y` annotation point.
pub fn parse_point(s: &str) -> Result<crate::model::CheckMark, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{}'", s))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("invalid x in '{}'", s))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("invalid y in '{}'", s))?;
    Ok(crate::model::CheckMark { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2026-10-16").unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
        );
        assert!(parse_date("16/10/2026").is_err());
    }

    #[test]
    fn test_parse_point() {
        let mark = parse_point("0.25, 0.5").unwrap();
        assert_eq!(mark.x, 0.25);
        assert_eq!(mark.y, 0.5);
        assert!(parse_point("0.25").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_yes_flag_confirms() {
        assert!(confirmer(true).confirm("정말?"));
    }
}
