use crate::steps::{classify, StepState, PIPELINE_STEPS};
use crate::{ChatMessage, ChatState, JobId, JobSnapshot, UploadPhase, UploadState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadView {
    pub phase: UploadPhase,
    pub file_name: Option<String>,
    pub job_id: Option<JobId>,
    pub status: Option<JobSnapshot>,
    /// Empty until the backend has accepted the upload.
    pub timeline: Vec<TimelineRow>,
    pub dirty: bool,
}

impl UploadView {
    pub(crate) fn from_state(state: &UploadState, dirty: bool) -> Self {
        let timeline = match (&state.job_id, &state.status) {
            (Some(_), Some(status)) => timeline(status.step.as_deref(), status.progress),
            _ => Vec::new(),
        };
        Self {
            phase: state.phase,
            file_name: state.file_name().map(ToOwned::to_owned),
            job_id: state.job_id.clone(),
            status: state.status.clone(),
            timeline,
            dirty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRow {
    pub id: &'static str,
    pub label: &'static str,
    pub state: StepState,
    /// Percentage for the current row only, clamped to 100.
    pub progress: Option<u32>,
}

/// One row per pipeline step for the reported `step` and `progress`.
pub fn timeline(step: Option<&str>, progress: u32) -> Vec<TimelineRow> {
    PIPELINE_STEPS
        .iter()
        .map(|descriptor| {
            let state = classify(PIPELINE_STEPS, descriptor.id, step);
            TimelineRow {
                id: descriptor.id,
                label: descriptor.label,
                state,
                progress: (state == StepState::Current).then_some(progress.min(100)),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatView {
    pub messages: Vec<ChatMessage>,
    pub is_loading: bool,
    pub loading_status: Option<String>,
    pub last_error: Option<String>,
    pub departments: Vec<String>,
    pub selected_department: Option<String>,
    pub document_count: usize,
    pub dirty: bool,
}

impl ChatView {
    pub(crate) fn from_state(state: &ChatState, dirty: bool) -> Self {
        Self {
            messages: state.messages.clone(),
            is_loading: state.is_loading(),
            loading_status: state.loading_status.clone(),
            last_error: state.last_error.clone(),
            departments: state.departments.clone(),
            selected_department: state.selected_department.clone(),
            document_count: state.documents.len(),
            dirty,
        }
    }
}
