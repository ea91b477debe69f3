use ragdesk_core::{ChatMessage, MessageRole, StepState, TimelineRow, UploadPhase, UploadView};

/// Upload status block: header line plus one line per pipeline step.
pub fn render_upload(view: &UploadView) -> String {
    let file_name = view.file_name.as_deref().unwrap_or("(no file)");
    let mut out = match (&view.phase, &view.status) {
        (UploadPhase::Selected, _) => format!("{file_name}: selected"),
        (UploadPhase::Submitting, _) => format!("{file_name}: uploading..."),
        (_, Some(status)) if status.message.is_empty() => format!("{file_name}: {:?}", view.phase),
        (_, Some(status)) => format!("{file_name}: {}", status.message),
        (_, None) => format!("{file_name}: {:?}", view.phase),
    };
    if let Some(job_id) = &view.job_id {
        out.push_str(&format!(" (job {job_id})"));
    }
    for row in &view.timeline {
        out.push('\n');
        out.push_str(&render_row(row));
    }
    out
}

fn render_row(row: &TimelineRow) -> String {
    match (row.state, row.progress) {
        (StepState::Completed, _) => format!("  [x] {}", row.label),
        (StepState::Current, Some(progress)) => format!("  [>] {} ({progress}%)", row.label),
        (StepState::Current, None) => format!("  [>] {}", row.label),
        (StepState::Pending, _) => format!("  [ ] {}", row.label),
    }
}

pub fn render_message(message: &ChatMessage) -> String {
    let prefix = match message.role {
        MessageRole::User => "you",
        MessageRole::Assistant => "assistant",
        MessageRole::Error => "error",
    };
    let mut out = format!("{prefix}> {}", message.content);

    let sources = message.context.as_ref().map_or(0, Vec::len);
    let mut details = Vec::new();
    if sources > 0 {
        details.push(format!("{sources} source(s)"));
    }
    if let Some(seconds) = message.search_time {
        details.push(format!("{seconds:.2}s"));
    }
    if let Some(searched) = message.total_documents_searched {
        details.push(format!("{searched} documents searched"));
    }
    if !details.is_empty() {
        out.push_str(&format!("\n    [{}]", details.join(", ")));
    }
    out
}
