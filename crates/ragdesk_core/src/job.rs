use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Opaque ingestion job identifier assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Coarse lifecycle state reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    /// Any status string this client does not know; treated as still running.
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One status report for a job, as last seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    #[serde(default)]
    pub step: Option<String>,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub message: String,
}

impl JobSnapshot {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            step: None,
            progress: 0,
            message: message.into(),
        }
    }
}

/// File chosen for upload, captured at selection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub path: PathBuf,
}

/// Extensions the upload widget offers; the backend does its own checks.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["txt", "pdf", "doc", "docx", "json", "md"];

pub fn is_accepted_upload(file_name: &str) -> bool {
    let Some((stem, ext)) = file_name.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty()
        && ACCEPTED_EXTENSIONS
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(ext))
}
