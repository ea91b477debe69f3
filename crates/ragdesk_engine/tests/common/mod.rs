#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

use ragdesk_core::{ChatAnswer, JobId, JobSnapshot, JobStatus, QueryRequest};
use ragdesk_engine::{
    ClientEvent, EventSink, JobTicket, RagApi, RequestError, RequestErrorKind, Transcription,
    UploadFile,
};
use serde_json::{json, Value};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(ragdesk_logging::initialize_for_tests);
}

pub fn backend_error(status: u16, message: &str) -> RequestError {
    RequestError {
        kind: RequestErrorKind::Backend { status },
        message: message.to_string(),
    }
}

pub fn snapshot(status: JobStatus, step: &str, progress: u32) -> JobSnapshot {
    JobSnapshot {
        status,
        step: Some(step.to_string()),
        progress,
        message: format!("{step} {progress}%"),
    }
}

pub fn answer(content: &str) -> ChatAnswer {
    ChatAnswer {
        content: content.to_string(),
        sources: vec![json!({"document": "handbook.pdf"})],
        search_time: Some(0.25),
        total_documents_searched: Some(3),
    }
}

/// Scripted backend. Status replies are served in order; once the script
/// runs out every poll reports the job as still processing.
pub struct FakeApi {
    upload: Mutex<Option<Result<JobTicket, RequestError>>>,
    statuses: Mutex<VecDeque<Result<Option<JobSnapshot>, RequestError>>>,
    query: Mutex<Result<ChatAnswer, RequestError>>,
    query_delay: Duration,
    departments: Mutex<Result<Vec<String>, RequestError>>,
    uploads: AtomicUsize,
    status_calls: AtomicUsize,
    queries: Mutex<Vec<QueryRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            upload: Mutex::new(None),
            statuses: Mutex::new(VecDeque::new()),
            query: Mutex::new(Ok(answer("Forty-two."))),
            query_delay: Duration::ZERO,
            departments: Mutex::new(Ok(vec!["finance".to_string(), "hr".to_string()])),
            uploads: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_upload(self, result: Result<JobTicket, RequestError>) -> Self {
        *self.upload.lock().unwrap() = Some(result);
        self
    }

    pub fn with_statuses(self, script: Vec<Result<Option<JobSnapshot>, RequestError>>) -> Self {
        *self.statuses.lock().unwrap() = script.into();
        self
    }

    pub fn with_query(self, result: Result<ChatAnswer, RequestError>) -> Self {
        *self.query.lock().unwrap() = result;
        self
    }

    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    pub fn with_departments(self, result: Result<Vec<String>, RequestError>) -> Self {
        *self.departments.lock().unwrap() = result;
        self
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<QueryRequest> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RagApi for FakeApi {
    async fn upload_document(&self, _file: UploadFile) -> Result<JobTicket, RequestError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.upload.lock().unwrap().clone().unwrap_or_else(|| {
            Ok(JobTicket {
                job_id: JobId::from("job-1"),
                message: Some("File uploaded successfully".to_string()),
            })
        })
    }

    async fn job_status(&self, _job_id: &JobId) -> Result<Option<JobSnapshot>, RequestError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Some(snapshot(JobStatus::Processing, "embedding", 50))))
    }

    async fn send_query(&self, request: &QueryRequest) -> Result<ChatAnswer, RequestError> {
        self.queries.lock().unwrap().push(request.clone());
        if !self.query_delay.is_zero() {
            tokio::time::sleep(self.query_delay).await;
        }
        self.query.lock().unwrap().clone()
    }

    async fn transcribe_audio(&self, _file: UploadFile) -> Result<Transcription, RequestError> {
        Ok(Transcription {
            text: "hello".to_string(),
        })
    }

    async fn check_health(&self) -> Result<Value, RequestError> {
        Ok(json!({"status": "healthy"}))
    }

    async fn departments(&self) -> Result<Vec<String>, RequestError> {
        self.departments.lock().unwrap().clone()
    }

    async fn documents(&self) -> Result<Vec<Value>, RequestError> {
        Ok(vec![json!({"id": "doc-1"}), json!({"id": "doc-2"})])
    }

    async fn stats(&self) -> Result<Value, RequestError> {
        Err(backend_error(503, "stats unavailable"))
    }

    async fn insert_text(&self, _text: &str) -> Result<Value, RequestError> {
        Ok(json!({"status": "success"}))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ClientEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ClientEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn completions(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ClientEvent::UploadCompleted { file_name } => Some(file_name),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: ClientEvent) {
        self.events.lock().unwrap().push(event);
    }
}
