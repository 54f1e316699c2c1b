use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identity of a tracked file. Never reused within one tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Pending,
    Uploading,
    Completed,
    Error,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Pending => "pending",
            FileStatus::Uploading => "uploading",
            FileStatus::Completed => "completed",
            FileStatus::Error => "error",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(FileStatus::Pending),
            "uploading" => Some(FileStatus::Uploading),
            "completed" => Some(FileStatus::Completed),
            "error" => Some(FileStatus::Error),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FileStatus::Completed | FileStatus::Error)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal upload transition {from} -> {to}")]
pub struct TransitionError {
    pub from: FileStatus,
    pub to: FileStatus,
}

/// Tracked state of one selected file.
///
/// Status only moves forward: pending, uploading, then completed or error.
/// The attachment id is set exactly when the status is completed, which is
/// why the fields are private and mutated through the transition methods.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: FileId,
    pub name: String,
    pub size: u64,
    status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachment_id: Option<String>,
}

impl UploadedFile {
    pub fn new(id: FileId, name: impl Into<String>, size: u64) -> Self {
        Self {
            id,
            name: name.into(),
            size,
            status: FileStatus::Pending,
            attachment_id: None,
        }
    }

    pub fn status(&self) -> FileStatus {
        self.status
    }

    pub fn attachment_id(&self) -> Option<&str> {
        self.attachment_id.as_deref()
    }

    /// pending -> uploading
    pub fn begin(&mut self) -> Result<(), TransitionError> {
        self.transition(FileStatus::Pending, FileStatus::Uploading)
    }

    /// uploading -> completed, recording the registered attachment.
    pub fn complete(&mut self, attachment_id: String) -> Result<(), TransitionError> {
        self.transition(FileStatus::Uploading, FileStatus::Completed)?;
        self.attachment_id = Some(attachment_id);
        Ok(())
    }

    /// uploading -> error
    pub fn fail(&mut self) -> Result<(), TransitionError> {
        self.transition(FileStatus::Uploading, FileStatus::Error)
    }

    fn transition(&mut self, from: FileStatus, to: FileStatus) -> Result<(), TransitionError> {
        if self.status != from {
            return Err(TransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}
