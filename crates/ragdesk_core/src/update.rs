use crate::state::{LOADING_STATUSES, NO_RESPONSE_PLACEHOLDER, UPLOAD_FAILED_MESSAGE};
use crate::steps::INITIAL_STEP;
use crate::{
    is_accepted_upload, ChatEffect, ChatMsg, ChatState, JobSnapshot, JobStatus, MessageRole,
    QueryRequest, UploadEffect, UploadMsg, UploadPhase, UploadState,
};

/// Pure update function for the upload widget and its job poller.
pub fn update_upload(mut state: UploadState, msg: UploadMsg) -> (UploadState, Vec<UploadEffect>) {
    // Teardown is final: late uploads, ticks and poll responses are dropped.
    if state.torn_down {
        return (state, Vec::new());
    }

    let effects = match msg {
        UploadMsg::FileSelected(file) => {
            let selectable = matches!(state.phase, UploadPhase::Idle | UploadPhase::Selected);
            if selectable && is_accepted_upload(&file.name) {
                state.file = Some(file);
                state.phase = UploadPhase::Selected;
                state.mark_dirty();
            }
            Vec::new()
        }
        UploadMsg::FileCleared => {
            if state.phase == UploadPhase::Selected {
                state.file = None;
                state.phase = UploadPhase::Idle;
                state.mark_dirty();
            }
            Vec::new()
        }
        UploadMsg::SubmitClicked => {
            let file = match state.file.clone() {
                Some(file) if state.phase == UploadPhase::Selected => file,
                _ => return (state, Vec::new()),
            };
            state.phase = UploadPhase::Submitting;
            state.mark_dirty();
            vec![UploadEffect::Submit { file }]
        }
        UploadMsg::SubmitSucceeded { job_id } => {
            if state.phase != UploadPhase::Submitting {
                return (state, Vec::new());
            }
            state.job_id = Some(job_id);
            state.status = Some(JobSnapshot {
                status: JobStatus::Processing,
                step: Some(INITIAL_STEP.to_string()),
                progress: 0,
                message: "Uploaded".to_string(),
            });
            state.phase = UploadPhase::Tracking;
            state.timer_armed = true;
            state.mark_dirty();
            vec![UploadEffect::ArmPollTimer]
        }
        UploadMsg::SubmitFailed { message: _ } => {
            if state.phase == UploadPhase::Submitting {
                state.status = Some(JobSnapshot::failed(UPLOAD_FAILED_MESSAGE));
                state.phase = UploadPhase::Failed;
                state.mark_dirty();
            }
            Vec::new()
        }
        UploadMsg::PollTick => poll_tick(&mut state),
        UploadMsg::PollSucceeded { seq, snapshot } => {
            if state.phase != UploadPhase::Tracking || seq <= state.last_applied_seq {
                return (state, Vec::new());
            }
            state.consecutive_failures = 0;
            state.ticks_to_skip = 0;
            match snapshot {
                Some(snapshot) => {
                    state.last_applied_seq = seq;
                    apply_snapshot(&mut state, snapshot)
                }
                None => Vec::new(),
            }
        }
        UploadMsg::PollFailed { seq, message } => {
            if state.phase != UploadPhase::Tracking || seq <= state.last_applied_seq {
                return (state, Vec::new());
            }
            poll_failed(&mut state, &message)
        }
        UploadMsg::TornDown => {
            state.torn_down = true;
            state.mark_dirty();
            disarm(&mut state).into_iter().collect()
        }
    };

    (state, effects)
}

fn poll_tick(state: &mut UploadState) -> Vec<UploadEffect> {
    if state.phase != UploadPhase::Tracking {
        return Vec::new();
    }
    if state.ticks_to_skip > 0 {
        state.ticks_to_skip -= 1;
        return Vec::new();
    }
    let Some(job_id) = state.job_id.clone() else {
        return Vec::new();
    };
    state.last_issued_seq += 1;
    vec![UploadEffect::Poll {
        job_id,
        seq: state.last_issued_seq,
    }]
}

fn apply_snapshot(state: &mut UploadState, snapshot: JobSnapshot) -> Vec<UploadEffect> {
    let status = snapshot.status;
    state.status = Some(snapshot);
    state.mark_dirty();

    let mut effects = Vec::new();
    match status {
        JobStatus::Completed => {
            state.phase = UploadPhase::Completed;
            effects.extend(disarm(state));
            if !state.completion_notified {
                state.completion_notified = true;
                if let Some(file_name) = state.file_name() {
                    effects.push(UploadEffect::NotifyCompleted {
                        file_name: file_name.to_string(),
                    });
                }
            }
        }
        JobStatus::Failed => {
            state.phase = UploadPhase::Failed;
            effects.extend(disarm(state));
        }
        JobStatus::Queued | JobStatus::Processing | JobStatus::Unknown => {}
    }
    effects
}

fn poll_failed(state: &mut UploadState, message: &str) -> Vec<UploadEffect> {
    state.consecutive_failures = state.consecutive_failures.saturating_add(1);
    let exhausted = state
        .policy
        .max_consecutive_failures
        .is_some_and(|max| state.consecutive_failures >= max);

    if !exhausted {
        state.ticks_to_skip =
            backoff_ticks(state.consecutive_failures, state.policy.max_backoff_ticks);
        return Vec::new();
    }

    let previous = state.status.take();
    state.status = Some(JobSnapshot {
        status: JobStatus::Failed,
        step: previous.as_ref().and_then(|status| status.step.clone()),
        progress: previous.as_ref().map_or(0, |status| status.progress),
        message: format!("Lost contact with ingestion job: {message}"),
    });
    state.phase = UploadPhase::Failed;
    state.mark_dirty();
    disarm(state).into_iter().collect()
}

/// Poll intervals to skip after `failures` consecutive failed polls.
pub fn backoff_ticks(failures: u32, max_backoff_ticks: u32) -> u32 {
    if failures == 0 {
        return 0;
    }
    1u32.checked_shl(failures - 1)
        .unwrap_or(u32::MAX)
        .saturating_sub(1)
        .min(max_backoff_ticks)
}

fn disarm(state: &mut UploadState) -> Option<UploadEffect> {
    if !state.timer_armed {
        return None;
    }
    state.timer_armed = false;
    Some(UploadEffect::DisarmPollTimer)
}

/// Pure update function for the chat transcript and its query lifecycle.
pub fn update_chat(mut state: ChatState, msg: ChatMsg) -> (ChatState, Vec<ChatEffect>) {
    let effects = match msg {
        ChatMsg::SendRequested { text, options, at } => {
            let query = text.trim();
            if query.is_empty() {
                return (state, Vec::new());
            }
            let query = query.to_string();
            state.push_message(MessageRole::User, query.clone(), at);
            let request_id = state.begin_request();
            state.last_error = None;
            state.loading_status = Some(LOADING_STATUSES[0].to_string());
            state.status_owner = Some(request_id);
            state.mark_dirty();

            let department = match options.department {
                Some(department) => department,
                None => state.selected_department.clone(),
            };
            let request = QueryRequest {
                query,
                mode: options.mode.unwrap_or_else(|| state.default_mode.clone()),
                only_need_context: options.only_need_context,
                department,
            };
            vec![
                ChatEffect::ArmStatusTimers { request_id },
                ChatEffect::IssueQuery {
                    request_id,
                    request,
                },
            ]
        }
        ChatMsg::StatusAdvanced { request_id, stage } => {
            let owns_status = state.status_owner == Some(request_id);
            if owns_status && state.is_in_flight(request_id) {
                if let Some(status) = LOADING_STATUSES.get(stage) {
                    state.loading_status = Some((*status).to_string());
                    state.mark_dirty();
                }
            }
            Vec::new()
        }
        ChatMsg::QueryAnswered {
            request_id,
            answer,
            at,
        } => {
            if !state.finish_request(request_id) {
                return (state, Vec::new());
            }
            let content = if answer.content.is_empty() {
                NO_RESPONSE_PLACEHOLDER.to_string()
            } else {
                answer.content
            };
            let message = state.push_message(MessageRole::Assistant, content, at);
            message.context = Some(answer.sources);
            message.search_time = answer.search_time;
            message.total_documents_searched = answer.total_documents_searched;
            state.mark_dirty();
            vec![ChatEffect::CancelStatusTimers { request_id }]
        }
        ChatMsg::QueryFailed {
            request_id,
            message,
            at,
        } => {
            if !state.finish_request(request_id) {
                return (state, Vec::new());
            }
            state.push_message(
                MessageRole::Error,
                format!("Sorry, I encountered an error: {message}"),
                at,
            );
            state.last_error = Some(message);
            state.mark_dirty();
            vec![ChatEffect::CancelStatusTimers { request_id }]
        }
        ChatMsg::QueryAbandoned { request_id } => {
            if !state.finish_request(request_id) {
                return (state, Vec::new());
            }
            state.mark_dirty();
            vec![ChatEffect::CancelStatusTimers { request_id }]
        }
        ChatMsg::ClearRequested => {
            state.messages.clear();
            state.last_error = None;
            state.mark_dirty();
            Vec::new()
        }
        ChatMsg::UploadCompleted { file_name, at } => {
            state.push_message(
                MessageRole::Assistant,
                format!(
                    "**System:** File `{file_name}` successfully ingested. I can now answer questions about it."
                ),
                at,
            );
            state.mark_dirty();
            Vec::new()
        }
        ChatMsg::DepartmentsLoaded(departments) => {
            state.departments = departments;
            state.mark_dirty();
            Vec::new()
        }
        ChatMsg::DepartmentSelected(department) => {
            state.selected_department = department;
            state.mark_dirty();
            Vec::new()
        }
        ChatMsg::DocumentsLoaded(documents) => {
            state.documents = documents;
            state.mark_dirty();
            Vec::new()
        }
    };

    (state, effects)
}
