use ragdesk_logging::rag_error;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::{ClientSettings, RequestError, RequestErrorKind};

pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// One call's method, header overrides and body.
///
/// A header set to `None` removes it from the defaults, e.g. the JSON
/// content type for multipart uploads.
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(HeaderName, Option<HeaderValue>)>,
    pub body: RequestBody,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn post_json<T: Serialize>(body: &T) -> Result<Self, RequestError> {
        let value = serde_json::to_value(body)
            .map_err(|err| RequestError::new(RequestErrorKind::InvalidRequest, err.to_string()))?;
        Ok(Self {
            method: Method::POST,
            headers: Vec::new(),
            body: RequestBody::Json(value),
        })
    }

    pub fn post_multipart(form: Form) -> Self {
        Self {
            method: Method::POST,
            headers: vec![(CONTENT_TYPE, None)],
            body: RequestBody::Multipart(form),
        }
    }
}

/// Thin JSON-over-HTTP wrapper around the backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, RequestError> {
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|err| RequestError::new(RequestErrorKind::InvalidRequest, err.to_string()))?;

        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RequestError::new(RequestErrorKind::Transport, err.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs one call and returns the parsed JSON body.
    ///
    /// Every failure is logged with `path` before it is returned.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, RequestError> {
        let result = self.send(path, options).await;
        if let Err(err) = &result {
            rag_error!("API request failed for {}: {} ({})", path, err, err.kind);
        }
        result
    }

    async fn send(&self, path: &str, options: RequestOptions) -> Result<Value, RequestError> {
        let url = reqwest::Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|err| RequestError::new(RequestErrorKind::InvalidRequest, err.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in options.headers {
            match value {
                Some(value) => {
                    headers.insert(name, value);
                }
                None => {
                    headers.remove(name);
                }
            }
        }

        let builder = self.http.request(options.method, url).headers(headers);
        let builder = match options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(value.to_string()),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await;

        if !status.is_success() {
            let detail = body
                .ok()
                .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
                .and_then(|value| detail_message(&value));
            let message = detail.unwrap_or_else(|| status_line(status));
            return Err(RequestError::new(
                RequestErrorKind::Backend {
                    status: status.as_u16(),
                },
                message,
            ));
        }

        let bytes = body.map_err(map_reqwest_error)?;
        serde_json::from_slice(&bytes)
            .map_err(|err| RequestError::new(RequestErrorKind::Decode, err.to_string()))
    }
}

fn detail_message(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::Null => None,
        Value::String(detail) if detail.is_empty() => None,
        Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

fn status_line(status: StatusCode) -> String {
    let line = format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    );
    line.trim_end().to_string()
}

fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    RequestError::new(RequestErrorKind::Transport, err.to_string())
}
