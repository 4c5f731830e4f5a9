use std::fmt;

use crate::model::{CheckMark, RequestDraft};

pub const SOFT_DELETE_PROMPT: &str = "정말로 이 작업을 삭제하시겠습니까?";
pub const PERMANENT_DELETE_PROMPT: &str = "정말 완전 삭제하시겠습니까?";

/// The closed set of board state transitions.
#[derive(Debug, Clone)]
pub enum BoardCommand {
    Create(RequestDraft),
    Edit { id: i64, draft: RequestDraft },
    Complete(i64),
    Recover(i64),
    SoftDelete(i64),
    PermanentDelete(i64),
    MoveOutOfHolding(i64),
    ToggleWorkDone(i64),
    SetCheckMarks { id: i64, marks: Vec<CheckMark> },
}

impl BoardCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BoardCommand::Create(_) => "create",
            BoardCommand::Edit { .. } => "edit",
            BoardCommand::Complete(_) => "complete",
            BoardCommand::Recover(_) => "recover",
            BoardCommand::SoftDelete(_) => "soft-delete",
            BoardCommand::PermanentDelete(_) => "permanent-delete",
            BoardCommand::MoveOutOfHolding(_) => "move-out-of-holding",
            BoardCommand::ToggleWorkDone(_) => "toggle-work-done",
            BoardCommand::SetCheckMarks { .. } => "set-check-marks",
        }
    }

    /// Target row, for every command but `Create`.
    pub fn target(&self) -> Option<i64> {
        match self {
            BoardCommand::Create(_) => None,
            BoardCommand::Edit { id, .. } | BoardCommand::SetCheckMarks { id, .. } => Some(*id),
            BoardCommand::Complete(id)
            | BoardCommand::Recover(id)
            | BoardCommand::SoftDelete(id)
            | BoardCommand::PermanentDelete(id)
            | BoardCommand::MoveOutOfHolding(id)
            | BoardCommand::ToggleWorkDone(id) => Some(*id),
        }
    }

    /// Confirmation text for destructive commands.
    pub fn confirmation_prompt(&self) -> Option<&'static str> {
        match self {
            BoardCommand::SoftDelete(_) => Some(SOFT_DELETE_PROMPT),
            BoardCommand::PermanentDelete(_) => Some(PERMANENT_DELETE_PROMPT),
            _ => None,
        }
    }
}

impl fmt::Display for BoardCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target() {
            Some(id) => write!(f, "{} #{}", self.name(), id),
            None => write!(f, "{}", self.name()),
        }
    }
}

/// Asks the user before a destructive command is issued.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms every prompt. For scripted use (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Declines every prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl Confirm for NeverConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// Result of a command that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The write was issued. Carries the affected row id.
    Applied(i64),
    /// The user declined the confirmation; nothing was written.
    Declined,
}
