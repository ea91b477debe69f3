//! Canonical ingestion pipeline steps and their display classification.

use std::cmp::Ordering;

/// One stage of the backend ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDescriptor {
    pub id: &'static str,
    pub label: &'static str,
}

/// The fixed, ordered pipeline every ingestion job walks through.
pub const PIPELINE_STEPS: &[StepDescriptor] = &[
    StepDescriptor {
        id: "uploaded",
        label: "Uploaded",
    },
    StepDescriptor {
        id: "extracting_text",
        label: "Extracting Text",
    },
    StepDescriptor {
        id: "chunking",
        label: "Chunking",
    },
    StepDescriptor {
        id: "embedding",
        label: "Embedding (Vyakarth)",
    },
    StepDescriptor {
        id: "indexing",
        label: "Indexing",
    },
    StepDescriptor {
        id: "ready",
        label: "Ready",
    },
];

/// Step id the poller seeds right after a successful upload.
pub const INITIAL_STEP: &str = "uploaded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Completed,
    Current,
    Pending,
}

/// Position of `step_id` in `steps`, if present.
pub fn step_index(steps: &[StepDescriptor], step_id: &str) -> Option<usize> {
    steps.iter().position(|step| step.id == step_id)
}

/// Classifies `step_id` relative to the step the job currently reports.
///
/// Without a recognised current step every step is pending. An unknown
/// `step_id` sorts before every known step.
pub fn classify(steps: &[StepDescriptor], step_id: &str, current: Option<&str>) -> StepState {
    let Some(current_index) = current.and_then(|id| step_index(steps, id)) else {
        return StepState::Pending;
    };
    match step_index(steps, step_id).cmp(&Some(current_index)) {
        Ordering::Less => StepState::Completed,
        Ordering::Equal => StepState::Current,
        Ordering::Greater => StepState::Pending,
    }
}
