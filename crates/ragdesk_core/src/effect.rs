use crate::{JobId, QueryRequest, RequestId, SelectedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEffect {
    Submit { file: SelectedFile },
    ArmPollTimer,
    Poll { job_id: JobId, seq: u64 },
    DisarmPollTimer,
    NotifyCompleted { file_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEffect {
    ArmStatusTimers { request_id: RequestId },
    IssueQuery {
        request_id: RequestId,
        request: QueryRequest,
    },
    CancelStatusTimers { request_id: RequestId },
}
