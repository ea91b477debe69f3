mod common;

use common::init_logging;
use pretty_assertions::assert_eq;
use ragdesk_core::{JobId, JobStatus, QueryRequest};
use ragdesk_engine::{
    ApiClient, ClientSettings, HttpRagApi, QueryResponse, RagApi, RequestErrorKind, UploadFile,
    DEPARTMENTS_PATH, DOCUMENTS_PATH, INSERT_TEXT_PATH, QUERY_PATH, TRANSCRIBE_PATH, UPLOAD_PATH,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer) -> HttpRagApi {
    init_logging();
    let settings = ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    };
    HttpRagApi::new(ApiClient::new(&settings).expect("client"))
}

fn question(text: &str) -> QueryRequest {
    QueryRequest {
        query: text.to_string(),
        mode: "hybrid".to_string(),
        only_need_context: false,
        department: None,
    }
}

#[tokio::test]
async fn upload_posts_multipart_file_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains(r#"name="file"; filename="notes.md""#))
        .and(body_string_contains("Quarterly numbers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": "a1b2",
            "message": "File uploaded successfully",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ticket = api(&server)
        .upload_document(UploadFile::new("notes.md", "Quarterly numbers"))
        .await
        .expect("upload ok");
    assert_eq!(ticket.job_id, JobId::from("a1b2"));
    assert_eq!(ticket.message.as_deref(), Some("File uploaded successfully"));
}

#[tokio::test]
async fn upload_without_job_id_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;

    let err = api(&server)
        .upload_document(UploadFile::new("notes.md", "x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, RequestErrorKind::Decode);
}

#[tokio::test]
async fn job_status_reads_the_data_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ingest/status/a1b2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "status": "processing",
                "step": "embedding",
                "progress": 55,
                "message": "Embedding chunks",
            }
        })))
        .mount(&server)
        .await;

    let snapshot = api(&server)
        .job_status(&JobId::from("a1b2"))
        .await
        .expect("status ok")
        .expect("payload");
    assert_eq!(snapshot.status, JobStatus::Processing);
    assert_eq!(snapshot.step.as_deref(), Some("embedding"));
    assert_eq!(snapshot.progress, 55);
    assert_eq!(snapshot.message, "Embedding chunks");
}

#[tokio::test]
async fn job_status_tolerates_missing_payload_and_unknown_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ingest/status/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ingest/status/odd"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"status": "paused"}})),
        )
        .mount(&server)
        .await;

    let api = api(&server);
    assert_eq!(api.job_status(&JobId::from("empty")).await.unwrap(), None);
    let odd = api.job_status(&JobId::from("odd")).await.unwrap().unwrap();
    assert_eq!(odd.status, JobStatus::Unknown);
    assert_eq!(odd.step, None);
    assert_eq!(odd.progress, 0);
}

#[tokio::test]
async fn query_sends_request_body_and_reads_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(body_json(json!({
            "query": "refund policy",
            "mode": "hybrid",
            "only_need_context": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": "Refunds within 30 days.",
            "sources": [{"document": "policy.pdf"}],
            "search_time": 0.4,
            "total_documents_searched": 12,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let answer = api(&server)
        .send_query(&question("refund policy"))
        .await
        .expect("query ok");
    assert_eq!(answer.content, "Refunds within 30 days.");
    assert_eq!(answer.sources, vec![json!({"document": "policy.pdf"})]);
    assert_eq!(answer.search_time, Some(0.4));
    assert_eq!(answer.total_documents_searched, Some(12));
}

#[tokio::test]
async fn query_includes_department_when_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(body_json(json!({
            "query": "leave",
            "mode": "local",
            "only_need_context": true,
            "department": "hr",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let request = QueryRequest {
        mode: "local".to_string(),
        only_need_context: true,
        department: Some("hr".to_string()),
        ..question("leave")
    };
    api(&server).send_query(&request).await.expect("query ok");
}

#[test]
fn legacy_query_fields_are_still_understood() {
    let legacy: QueryResponse = serde_json::from_value(json!({
        "response": "Old shape answer",
        "context": [{"chunk": 1}],
    }))
    .unwrap();
    let answer = legacy.into_answer();
    assert_eq!(answer.content, "Old shape answer");
    assert_eq!(answer.sources, vec![json!({"chunk": 1})]);

    let empty: QueryResponse = serde_json::from_value(json!({"data": ""})).unwrap();
    let answer = empty.into_answer();
    assert_eq!(answer.content, "No response data");
    assert!(answer.sources.is_empty());
}

#[tokio::test]
async fn transcription_posts_audio_as_file_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TRANSCRIBE_PATH))
        .and(body_string_contains(r#"filename="memo.wav""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "call me back"})))
        .expect(1)
        .mount(&server)
        .await;

    let transcription = api(&server)
        .transcribe_audio(UploadFile::new("memo.wav", vec![0u8, 1, 2, 3]))
        .await
        .expect("transcribe ok");
    assert_eq!(transcription.text, "call me back");
}

#[tokio::test]
async fn directory_endpoints_unwrap_their_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DEPARTMENTS_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"departments": ["finance", "hr"]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {"documents": [{"id": "d1"}]},
        })))
        .mount(&server)
        .await;

    let api = api(&server);
    assert_eq!(
        api.departments().await.unwrap(),
        vec!["finance".to_string(), "hr".to_string()]
    );
    assert_eq!(api.documents().await.unwrap(), vec![json!({"id": "d1"})]);
}

#[tokio::test]
async fn health_and_stats_return_raw_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"documents": 4})))
        .mount(&server)
        .await;

    let api = api(&server);
    assert_eq!(api.check_health().await.unwrap(), json!({"status": "healthy"}));
    assert_eq!(api.stats().await.unwrap(), json!({"documents": 4}));
}

#[tokio::test]
async fn insert_text_posts_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INSERT_TEXT_PATH))
        .and(body_json(json!({"text": "Office closes at 5pm."})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    let reply = api(&server)
        .insert_text("Office closes at 5pm.")
        .await
        .expect("insert ok");
    assert_eq!(reply, json!({"status": "success"}));
}
