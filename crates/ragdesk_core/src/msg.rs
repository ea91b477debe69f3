use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{ChatAnswer, JobId, JobSnapshot, QueryOptions, RequestId, SelectedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadMsg {
    /// User picked a file in the upload widget.
    FileSelected(SelectedFile),
    /// User dismissed the picked file before submitting.
    FileCleared,
    /// User asked to start processing the selected file.
    SubmitClicked,
    /// Backend accepted the upload and assigned a job.
    SubmitSucceeded { job_id: JobId },
    /// Upload request failed or was rejected.
    SubmitFailed { message: String },
    /// Poll interval elapsed.
    PollTick,
    /// Status endpoint answered the poll issued with `seq`.
    PollSucceeded {
        seq: u64,
        snapshot: Option<JobSnapshot>,
    },
    /// Status request issued with `seq` failed.
    PollFailed { seq: u64, message: String },
    /// Owning view went away; stop everything.
    TornDown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatMsg {
    /// User submitted text from the input box.
    SendRequested {
        text: String,
        options: QueryOptions,
        at: DateTime<Utc>,
    },
    /// A delayed loading-status update fired.
    StatusAdvanced { request_id: RequestId, stage: usize },
    /// Query returned an answer.
    QueryAnswered {
        request_id: RequestId,
        answer: ChatAnswer,
        at: DateTime<Utc>,
    },
    /// Query failed in transport or backend.
    QueryFailed {
        request_id: RequestId,
        message: String,
        at: DateTime<Utc>,
    },
    /// Caller stopped waiting for the query; nothing is appended.
    QueryAbandoned { request_id: RequestId },
    /// User cleared the transcript.
    ClearRequested,
    /// An ingestion job finished successfully.
    UploadCompleted {
        file_name: String,
        at: DateTime<Utc>,
    },
    DepartmentsLoaded(Vec<String>),
    DepartmentSelected(Option<String>),
    DocumentsLoaded(Vec<Value>),
}
