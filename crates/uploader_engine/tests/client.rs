use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use uploader_engine::{
    AnalysisClient, ClientSettings, FailureKind, PaperUpload, ReqwestAnalysisClient,
    ResearchRequest, StatusReport,
};
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestAnalysisClient {
    let settings = ClientSettings::parse(&server.uri()).expect("mock uri is a valid base");
    ReqwestAnalysisClient::new(settings).expect("client builds")
}

fn paper() -> PaperUpload {
    PaperUpload::new("paper.pdf", "application/pdf", b"%PDF-1.4 test body".to_vec())
}

#[tokio::test]
async fn upload_sends_file_field_and_returns_task_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/upload-paper"))
        .and(body_string_contains(r#"name="file"; filename="paper.pdf""#))
        .and(body_string_contains("application/pdf"))
        .and(body_string_contains("%PDF-1.4 test body"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let task_id = client_for(&server).upload_paper(&paper()).await.expect("upload ok");
    assert_eq!(task_id, "abc");
}

#[tokio::test]
async fn upload_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/upload-paper"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
        .mount(&server)
        .await;

    let err = client_for(&server).upload_paper(&paper()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert_eq!(err.message, "boom");
}

#[tokio::test]
async fn upload_without_task_id_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/upload-paper"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "done"})))
        .mount(&server)
        .await;

    let err = client_for(&server).upload_paper(&paper()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MissingTaskId);
}

#[tokio::test]
async fn upload_with_empty_task_id_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/upload-paper"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": ""})))
        .mount(&server)
        .await;

    let err = client_for(&server).upload_paper(&paper()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MissingTaskId);
}

#[tokio::test]
async fn upload_with_non_json_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/upload-paper"))
        .respond_with(ResponseTemplate::new(200).set_body_string("accepted"))
        .mount(&server)
        .await;

    let err = client_for(&server).upload_paper(&paper()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidResponse);
}

#[tokio::test]
async fn upload_to_unreachable_server_is_network_error() {
    let settings = ClientSettings::parse("http://127.0.0.1:1").unwrap();
    let client = ReqwestAnalysisClient::new(settings).unwrap();

    let err = client.upload_paper(&paper()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
    assert!(!err.message.is_empty());
}

#[tokio::test]
async fn task_status_parses_each_state() {
    let server = MockServer::start().await;
    let bodies = [
        ("p", json!({"status": "processing", "elapsed_time": 60})),
        ("c", json!({"status": "completed", "result": {"x": 1}})),
        ("e", json!({"status": "error", "error": "bad pdf"})),
    ];
    for (task_id, body) in &bodies {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/task-status/{task_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    assert_eq!(
        client.task_status("p").await.unwrap(),
        StatusReport::Pending {
            elapsed_secs: Some(60.0)
        }
    );
    assert_eq!(
        client.task_status("c").await.unwrap(),
        StatusReport::Completed {
            result: Some(json!({"x": 1}))
        }
    );
    assert_eq!(
        client.task_status("e").await.unwrap(),
        StatusReport::Failed {
            message: Some("bad pdf".to_string())
        }
    );
}

#[tokio::test]
async fn task_status_not_found_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/task-status/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Task not found"})))
        .mount(&server)
        .await;

    let err = client_for(&server).task_status("gone").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert_eq!(err.message, "Task not found");
}

#[tokio::test]
async fn task_status_with_garbage_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/task-status/t"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).task_status("t").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidResponse);
}

#[tokio::test]
async fn task_status_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/task-status/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"status": "pending"})),
        )
        .mount(&server)
        .await;

    let mut settings = ClientSettings::parse(&server.uri()).unwrap();
    settings.request_timeout = Duration::from_millis(50);
    let client = ReqwestAnalysisClient::new(settings).unwrap();

    let err = client.task_status("slow").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn research_posts_topic_and_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/research"))
        .and(body_json(json!({"topic": "protein folding", "max_papers": 3})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"plan": ["search"], "results": {"papers": []}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = ResearchRequest {
        topic: "protein folding".to_string(),
        max_papers: 3,
    };
    let response = client_for(&server).conduct_research(&request).await.unwrap();
    assert_eq!(
        response,
        json!({"plan": ["search"], "results": {"papers": []}})
    );
}
