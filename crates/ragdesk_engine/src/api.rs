use std::path::Path;

use bytes::Bytes;
use ragdesk_core::{ChatAnswer, JobId, JobSnapshot, QueryRequest, NO_RESPONSE_PLACEHOLDER};
use ragdesk_logging::rag_error;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transport::{ApiClient, RequestOptions};
use crate::{RequestError, RequestErrorKind, UploadError};

pub const UPLOAD_PATH: &str = "/api/v1/ingest/upload";
pub const INSERT_TEXT_PATH: &str = "/api/v1/ingest/text";
pub const STATUS_PATH: &str = "/api/v1/ingest/status";
pub const QUERY_PATH: &str = "/api/v1/chat/query";
pub const TRANSCRIBE_PATH: &str = "/api/v1/transcribe";
pub const HEALTH_PATH: &str = "/health";
pub const DEPARTMENTS_PATH: &str = "/api/v1/departments";
pub const DOCUMENTS_PATH: &str = "/api/v1/documents";
pub const STATS_PATH: &str = "/api/v1/stats";

/// A file's name and bytes, ready for a multipart `file` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn read(path: &Path) -> Result<Self, UploadError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }

    fn into_form(self) -> Form {
        let len = self.bytes.len() as u64;
        let part = Part::stream_with_length(self.bytes, len)
            .file_name(self.file_name);
        Form::new().part("file", part)
    }
}

/// Backend acknowledgement of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTicket {
    pub job_id: JobId,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Transcription {
    pub text: String,
}

/// Backend operations the client consumes.
#[async_trait::async_trait]
pub trait RagApi: Send + Sync {
    async fn upload_document(&self, file: UploadFile) -> Result<JobTicket, RequestError>;

    /// `Ok(None)` when the backend answered without a status payload.
    async fn job_status(&self, job_id: &JobId) -> Result<Option<JobSnapshot>, RequestError>;

    async fn send_query(&self, request: &QueryRequest) -> Result<ChatAnswer, RequestError>;

    async fn transcribe_audio(&self, file: UploadFile) -> Result<Transcription, RequestError>;

    async fn check_health(&self) -> Result<Value, RequestError>;

    async fn departments(&self) -> Result<Vec<String>, RequestError>;

    async fn documents(&self) -> Result<Vec<Value>, RequestError>;

    async fn stats(&self) -> Result<Value, RequestError>;

    async fn insert_text(&self, text: &str) -> Result<Value, RequestError>;
}

#[derive(Debug, Deserialize)]
struct UploadAccepted {
    #[serde(default)]
    job_id: Option<JobId>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    #[serde(default)]
    data: Option<JobSnapshot>,
}

/// Raw query reply. `response` and `context` are older names for `data`
/// and `sources`; [`QueryResponse::into_answer`] is the only place that
/// still reads them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<Value>>,
    #[serde(default)]
    pub context: Option<Vec<Value>>,
    #[serde(default)]
    pub search_time: Option<f64>,
    #[serde(default)]
    pub total_documents_searched: Option<u64>,
}

impl QueryResponse {
    pub fn into_answer(self) -> ChatAnswer {
        let content = [self.data, self.response]
            .into_iter()
            .flatten()
            .find(|text| !text.is_empty())
            .unwrap_or_else(|| NO_RESPONSE_PLACEHOLDER.to_string());
        let sources = self.sources.or(self.context).unwrap_or_default();
        ChatAnswer {
            content,
            sources,
            search_time: self.search_time,
            total_documents_searched: self.total_documents_searched,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DepartmentList {
    #[serde(default)]
    departments: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentsEnvelope {
    data: DocumentList,
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct InsertText<'a> {
    text: &'a str,
}

/// [`RagApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRagApi {
    client: ApiClient,
}

impl HttpRagApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, RequestError> {
    serde_json::from_value(value).map_err(|err| {
        let err = RequestError::new(RequestErrorKind::Decode, err.to_string());
        rag_error!("Unexpected response shape from {}: {}", path, err);
        err
    })
}

#[async_trait::async_trait]
impl RagApi for HttpRagApi {
    async fn upload_document(&self, file: UploadFile) -> Result<JobTicket, RequestError> {
        let value = self
            .client
            .request(UPLOAD_PATH, RequestOptions::post_multipart(file.into_form()))
            .await?;
        let accepted: UploadAccepted = decode(UPLOAD_PATH, value)?;
        match accepted.job_id {
            Some(job_id) => Ok(JobTicket {
                job_id,
                message: accepted.message,
            }),
            None => {
                let err =
                    RequestError::new(RequestErrorKind::Decode, "upload response has no job_id");
                rag_error!("Unexpected response shape from {}: {}", UPLOAD_PATH, err);
                Err(err)
            }
        }
    }

    async fn job_status(&self, job_id: &JobId) -> Result<Option<JobSnapshot>, RequestError> {
        let path = format!("{STATUS_PATH}/{job_id}");
        let value = self.client.request(&path, RequestOptions::get()).await?;
        let envelope: StatusEnvelope = decode(&path, value)?;
        Ok(envelope.data)
    }

    async fn send_query(&self, request: &QueryRequest) -> Result<ChatAnswer, RequestError> {
        let value = self
            .client
            .request(QUERY_PATH, RequestOptions::post_json(request)?)
            .await?;
        let response: QueryResponse = decode(QUERY_PATH, value)?;
        Ok(response.into_answer())
    }

    async fn transcribe_audio(&self, file: UploadFile) -> Result<Transcription, RequestError> {
        let value = self
            .client
            .request(TRANSCRIBE_PATH, RequestOptions::post_multipart(file.into_form()))
            .await?;
        decode(TRANSCRIBE_PATH, value)
    }

    async fn check_health(&self) -> Result<Value, RequestError> {
        self.client
            .request(HEALTH_PATH, RequestOptions::get())
            .await
    }

    async fn departments(&self) -> Result<Vec<String>, RequestError> {
        let value = self
            .client
            .request(DEPARTMENTS_PATH, RequestOptions::get())
            .await?;
        let list: DepartmentList = decode(DEPARTMENTS_PATH, value)?;
        Ok(list.departments)
    }

    async fn documents(&self) -> Result<Vec<Value>, RequestError> {
        let value = self
            .client
            .request(DOCUMENTS_PATH, RequestOptions::get())
            .await?;
        let envelope: DocumentsEnvelope = decode(DOCUMENTS_PATH, value)?;
        Ok(envelope.data.documents)
    }

    async fn stats(&self) -> Result<Value, RequestError> {
        self.client.request(STATS_PATH, RequestOptions::get()).await
    }

    async fn insert_text(&self, text: &str) -> Result<Value, RequestError> {
        let body = InsertText { text };
        self.client
            .request(INSERT_TEXT_PATH, RequestOptions::post_json(&body)?)
            .await
    }
}
