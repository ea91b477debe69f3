use serde::Serialize;
use serde_json::Value;

/// Caller-supplied overrides for one chat query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub mode: Option<String>,
    pub only_need_context: bool,
    /// `Some(None)` explicitly clears the session's selected department.
    pub department: Option<Option<String>>,
}

/// Body of `POST /api/v1/chat/query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub mode: String,
    pub only_need_context: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// Assistant reply resolved from a successful query.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatAnswer {
    pub content: String,
    pub sources: Vec<Value>,
    pub search_time: Option<f64>,
    pub total_documents_searched: Option<u64>,
}
