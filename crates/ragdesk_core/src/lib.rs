//! Ragdesk core: pure state machines and view-model helpers for the RAG client.
mod effect;
mod job;
mod msg;
mod query;
mod state;
mod steps;
mod update;
mod view_model;

pub use effect::{ChatEffect, UploadEffect};
pub use job::{
    is_accepted_upload, JobId, JobSnapshot, JobStatus, SelectedFile, ACCEPTED_EXTENSIONS,
};
pub use msg::{ChatMsg, UploadMsg};
pub use query::{ChatAnswer, QueryOptions, QueryRequest};
pub use state::{
    ChatMessage, ChatState, MessageId, MessageRole, PollPolicy, RequestId, UploadPhase,
    UploadState, DEFAULT_RETRIEVAL_MODE, LOADING_STATUSES, NO_RESPONSE_PLACEHOLDER,
    UPLOAD_FAILED_MESSAGE,
};
pub use steps::{classify, step_index, StepDescriptor, StepState, INITIAL_STEP, PIPELINE_STEPS};
pub use update::{backoff_ticks, update_chat, update_upload};
pub use view_model::{timeline, ChatView, TimelineRow, UploadView};
