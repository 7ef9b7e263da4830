//! Command entry points.
//!
//! Commands take the editor context captured when they fired, resolve what
//! to compare, and dispatch the comparison. `report` is the top-level handler
//! that turns their results into something the host can show.
//!
//! - `diff_line_with_working`: compare the commit that last touched a line with the working copy
//! - `diff_with_previous`: compare a file commit with its parent
//! - `diff_with`: comparison requests and the renderer seam

pub mod diff_line_with_working;
pub mod diff_with;
pub mod diff_with_previous;

use serde::{Deserialize, Serialize};

use crate::error::{Abort, AppError, Outcome, Result};

pub use diff_line_with_working::DiffLineWithWorkingArgs;
pub use diff_with::{ComparisonRequest, DiffRenderer, DisplayOptions, build_comparison, dispatch};
pub use diff_with_previous::DiffWithPreviousArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandId {
    #[serde(rename = "revlens.diffWith")]
    DiffWith,
    #[serde(rename = "revlens.diffLineWithWorking")]
    DiffLineWithWorking,
    #[serde(rename = "revlens.diffWithPrevious")]
    DiffWithPrevious,
    #[serde(rename = "revlens.showAllCommits")]
    ShowAllCommits,
}

impl CommandId {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandId::DiffWith => "revlens.diffWith",
            CommandId::DiffLineWithWorking => "revlens.diffLineWithWorking",
            CommandId::DiffWithPrevious => "revlens.diffWithPrevious",
            CommandId::ShowAllCommits => "revlens.showAllCommits",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub anchor_line: u32,
    pub active_line: u32,
}

/// Snapshot of the active editor when a command fires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorContext {
    /// Uri of the open document
    pub document: Option<String>,
    #[serde(default)]
    pub is_dirty: bool,
    #[serde(default)]
    pub selection: Selection,
}

impl EditorContext {
    pub fn cursor_line(&self) -> u32 {
        self.selection.active_line
    }
}

/// The uri a command acts on: the one it was invoked with, else the active
/// document.
pub fn command_uri<'a>(uri: Option<&'a str>, editor: Option<&'a EditorContext>) -> Option<&'a str> {
    uri.or_else(|| editor.and_then(|e| e.document.as_deref()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CommandResponse<T> {
    Completed { result: T },
    Aborted { reason: Abort },
    Notice { notice: Notice },
}

/// Top-level handler for comparison commands. Expected aborts stay silent,
/// an untracked file becomes a warning, and anything else is logged and
/// reported as an error notice.
pub fn report<T>(command: CommandId, result: Result<Outcome<T>>) -> CommandResponse<T> {
    match result {
        Ok(Outcome::Done(result)) => CommandResponse::Completed { result },
        Ok(Outcome::Aborted(reason)) => {
            tracing::debug!(command = command.as_str(), ?reason, "command aborted");
            CommandResponse::Aborted { reason }
        }
        Err(AppError::NotUnderSourceControl(path)) => {
            tracing::warn!(command = command.as_str(), %path, "file is not under source control");
            CommandResponse::Notice {
                notice: Notice {
                    level: NoticeLevel::Warning,
                    message: "Unable to open compare. The file is probably not under source control"
                        .to_string(),
                },
            }
        }
        Err(e) => {
            tracing::error!(command = command.as_str(), error = %e, "command failed");
            CommandResponse::Notice {
                notice: Notice {
                    level: NoticeLevel::Error,
                    message: "Unable to open compare. See the server log for more details"
                        .to_string(),
                },
            }
        }
    }
}
