use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::view_model::{ChatView, UploadView};
use crate::{JobId, JobSnapshot, SelectedFile};

/// Loading-status texts shown while a chat query is outstanding, in order.
pub const LOADING_STATUSES: [&str; 4] = [
    "Finding the document...",
    "We found it. Analyzing content...",
    "Getting it ready for your question...",
    "Generating response...",
];

pub const DEFAULT_RETRIEVAL_MODE: &str = "hybrid";
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed";
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Selected,
    Submitting,
    Tracking,
    Completed,
    Failed,
}

impl UploadPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadPhase::Completed | UploadPhase::Failed)
    }
}

/// Retry policy for failed status polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Consecutive failures that fail the job; `None` retries forever.
    pub max_consecutive_failures: Option<u32>,
    /// Upper bound on poll intervals skipped after a failure.
    pub max_backoff_ticks: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_consecutive_failures: Some(30),
            max_backoff_ticks: 8,
        }
    }
}

/// State of one upload widget and the single job it tracks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadState {
    pub(crate) phase: UploadPhase,
    pub(crate) file: Option<SelectedFile>,
    pub(crate) job_id: Option<JobId>,
    pub(crate) status: Option<JobSnapshot>,
    pub(crate) policy: PollPolicy,
    pub(crate) timer_armed: bool,
    pub(crate) torn_down: bool,
    pub(crate) completion_notified: bool,
    pub(crate) last_issued_seq: u64,
    pub(crate) last_applied_seq: u64,
    pub(crate) consecutive_failures: u32,
    pub(crate) ticks_to_skip: u32,
    dirty: bool,
}

impl UploadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: PollPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn status(&self) -> Option<&JobSnapshot> {
        self.status.as_ref()
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer_armed
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn view(&self) -> UploadView {
        UploadView::from_state(self, self.dirty)
    }

    pub(crate) fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|file| file.name.as_str())
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Retrieved source snippets; only on answered queries.
    pub context: Option<Vec<Value>>,
    pub search_time: Option<f64>,
    pub total_documents_searched: Option<u64>,
}

/// Transcript and query bookkeeping for one chat view.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatState {
    pub(crate) messages: Vec<ChatMessage>,
    pub(crate) in_flight: Vec<RequestId>,
    pub(crate) loading_status: Option<String>,
    pub(crate) status_owner: Option<RequestId>,
    pub(crate) last_error: Option<String>,
    pub(crate) departments: Vec<String>,
    pub(crate) selected_department: Option<String>,
    pub(crate) documents: Vec<Value>,
    pub(crate) default_mode: String,
    next_message_id: u64,
    next_request_id: u64,
    dirty: bool,
}

impl Default for ChatState {
    fn default() -> Self {
        Self::with_default_mode(DEFAULT_RETRIEVAL_MODE)
    }
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_mode(mode: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            in_flight: Vec::new(),
            loading_status: None,
            status_owner: None,
            last_error: None,
            departments: Vec::new(),
            selected_department: None,
            documents: Vec::new(),
            default_mode: mode.into(),
            next_message_id: 0,
            next_request_id: 0,
            dirty: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn loading_status(&self) -> Option<&str> {
        self.loading_status.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn departments(&self) -> &[String] {
        &self.departments
    }

    pub fn selected_department(&self) -> Option<&str> {
        self.selected_department.as_deref()
    }

    pub fn documents(&self) -> &[Value] {
        &self.documents
    }

    pub fn view(&self) -> ChatView {
        ChatView::from_state(self, self.dirty)
    }

    pub(crate) fn is_in_flight(&self, request_id: RequestId) -> bool {
        self.in_flight.contains(&request_id)
    }

    pub(crate) fn begin_request(&mut self) -> RequestId {
        self.next_request_id += 1;
        let request_id = RequestId(self.next_request_id);
        self.in_flight.push(request_id);
        request_id
    }

    /// Returns `false` when the request was not outstanding.
    ///
    /// The status line passes to the newest request still in flight and is
    /// cleared only once none remain.
    pub(crate) fn finish_request(&mut self, request_id: RequestId) -> bool {
        let before = self.in_flight.len();
        self.in_flight.retain(|id| *id != request_id);
        if self.in_flight.len() == before {
            return false;
        }
        if self.status_owner == Some(request_id) {
            self.status_owner = self.in_flight.last().copied();
            if self.status_owner.is_none() {
                self.loading_status = None;
            }
        }
        true
    }

    pub(crate) fn push_message(
        &mut self,
        role: MessageRole,
        content: String,
        timestamp: DateTime<Utc>,
    ) -> &mut ChatMessage {
        self.next_message_id += 1;
        self.messages.push(ChatMessage {
            id: MessageId(self.next_message_id),
            role,
            content,
            timestamp,
            context: None,
            search_time: None,
            total_documents_searched: None,
        });
        let last = self.messages.len() - 1;
        &mut self.messages[last]
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }
}
