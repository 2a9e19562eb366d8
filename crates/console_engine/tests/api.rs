use console_engine::{ApiError, ApiSettings, ExecutionApi, ReqwestApi, ResultFetch};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestApi {
    ReqwestApi::new(&ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .expect("api")
}

#[tokio::test]
async fn submit_posts_input_and_returns_execution_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orchestrate"))
        .and(body_json(json!({ "user_input": "A note-taking app for nurses" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "execution_id": "abc123" })))
        .expect(1)
        .mount(&server)
        .await;

    let job_id = api_for(&server)
        .submit("A note-taking app for nurses")
        .await
        .expect("submit ok");
    assert_eq!(job_id, "abc123");
}

#[tokio::test]
async fn submit_surfaces_backend_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orchestrate"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "user_input is required" })))
        .mount(&server)
        .await;

    let err = api_for(&server).submit("").await.unwrap_err();
    assert_eq!(err, ApiError::Rejected("user_input is required".to_string()));
    assert_eq!(err.to_string(), "user_input is required");
}

#[tokio::test]
async fn status_without_error_body_maps_to_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/abc123"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = api_for(&server).status("abc123").await.unwrap_err();
    assert!(matches!(err, ApiError::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn status_parses_update_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "running",
            "current_step": "evaluation",
            "steps": [
                { "step": "research", "message": "Collecting sources" },
                { "step": "evaluation", "message": "Scoring" }
            ],
            "result": null
        })))
        .mount(&server)
        .await;

    let payload = api_for(&server).status("abc123").await.expect("status ok");
    assert_eq!(payload.status.as_deref(), Some("running"));
    assert_eq!(payload.current_step.as_deref(), Some("evaluation"));
    assert_eq!(payload.steps.len(), 2);
    assert_eq!(payload.steps[1].message, "Scoring");
    assert_eq!(payload.terminal(), None);
}

#[tokio::test]
async fn result_distinguishes_pending_from_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/result/running"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "status": "running" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/result/done"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "final_summary": { "raw_summary": "Worth building" }
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    assert_eq!(api.result("running").await, Ok(ResultFetch::Pending));
    assert_eq!(
        api.result("done").await,
        Ok(ResultFetch::Ready(json!({
            "final_summary": { "raw_summary": "Worth building" }
        })))
    );
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let api = ReqwestApi::new(&ApiSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        ..ApiSettings::default()
    })
    .expect("api");

    let err = api.status("abc123").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_) | ApiError::Timeout));
}

#[test]
fn rejects_base_url_that_cannot_hold_paths() {
    let err = ReqwestApi::new(&ApiSettings {
        base_url: "not a url".to_string(),
        ..ApiSettings::default()
    })
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidUrl(_)));
}
