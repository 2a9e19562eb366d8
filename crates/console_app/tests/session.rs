use std::fs;
use std::path::Path;
use std::time::Duration;

use console_app::{EffectRunner, Presenter, RegionOutput, SessionController};
use console_core::{LogLevel, Region, SessionState};
use console_engine::{ApiSettings, EngineHandle, TransportSettings};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Outcome {
    session: SessionState,
    log: Vec<(LogLevel, String)>,
    printed: String,
}

fn final_result() -> Value {
    json!({
        "agents_outputs": {
            "product_researcher": { "research_result": "# Findings\nLarge market" },
            "feasibility_evaluator": { "evaluation_result": { "feasibility_score": 8 } },
            "doc_assistant": { "document": "PRD body" }
        },
        "final_summary": {
            "feasibility_score": "8/10",
            "value_propositions": ["Saves charting time"],
            "raw_summary": "Go"
        }
    })
}

fn sse(messages: &[Value]) -> ResponseTemplate {
    let body: String = messages
        .iter()
        .map(|message| format!("data: {message}\n\n"))
        .collect();
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

async fn accept_submission(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/orchestrate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "execution_id": "abc123" })))
        .mount(server)
        .await;
}

async fn run_console(server: &MockServer, output_dir: &Path, input: &'static str) -> Outcome {
    let settings = ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    };
    let output_dir = output_dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let engine = EngineHandle::new(
            &settings,
            TransportSettings {
                poll_interval: Duration::from_millis(10),
            },
        )
        .expect("engine");
        let presenter = Presenter::new(Vec::new(), RegionOutput::new(output_dir));
        let mut session = SessionController::new(
            EffectRunner::new(engine),
            presenter,
            Duration::from_millis(20),
        );
        session.start(input).expect("start");
        let state = session.run_until_settled().expect("settle");
        let log = session
            .state()
            .log()
            .iter()
            .map(|entry| (entry.level, entry.message.clone()))
            .collect();
        let printed = String::from_utf8(session.dispose()).expect("utf8");
        Outcome {
            session: state,
            log,
            printed,
        }
    })
    .await
    .expect("join")
}

fn messages(outcome: &Outcome) -> Vec<&str> {
    outcome.log.iter().map(|(_, message)| message.as_str()).collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn pushed_run_renders_every_pane_and_summary() {
    let server = MockServer::start().await;
    accept_submission(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/stream/abc123"))
        .respond_with(sse(&[
            json!({
                "current_step": "research",
                "steps": [{ "step": "research", "message": "Starting analysis" }],
                "status": "running"
            }),
            json!({
                "current_step": "evaluation",
                "steps": [
                    { "step": "research", "message": "Starting analysis" },
                    { "step": "evaluation", "message": "Scoring" }
                ],
                "status": "running",
                "partial_research": "# Findings\nLarge market"
            }),
            json!({ "status": "completed", "done": true, "final_result": final_result() }),
        ]))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let outcome = run_console(&server, temp.path(), "Build a todo app").await;

    assert_eq!(outcome.session, SessionState::Completed);
    assert_eq!(
        messages(&outcome),
        vec![
            "Orchestration started, Execution ID: abc123",
            "[research] Starting analysis",
            "[evaluation] Scoring",
            "Results ready",
        ]
    );

    for region in Region::ALL {
        let file = temp.path().join(format!("{}.html", region.as_str()));
        let html = fs::read_to_string(&file).expect("region file");
        assert!(!html.contains('\u{258B}'), "cursor left in {}", region.as_str());
    }
    let research = fs::read_to_string(temp.path().join("research.html")).unwrap();
    assert!(research.contains("<h1>Findings</h1>"));
    assert!(research.contains("Large market"));

    let summary = fs::read_to_string(temp.path().join("summary.txt")).unwrap();
    assert!(summary.starts_with("Feasibility score: 8/10\n"));
    assert!(outcome
        .printed
        .contains("pipeline research:done evaluation:done summarization:done documentation:done finished:done"));
}

#[tokio::test(flavor = "multi_thread")]
async fn lost_stream_falls_back_to_polling_and_loads_result() {
    let server = MockServer::start().await;
    accept_submission(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/stream/abc123"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "current_step": "finished",
            "steps": [{ "step": "research", "message": "Starting analysis" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/result/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(final_result()))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let outcome = run_console(&server, temp.path(), "Build a todo app").await;

    assert_eq!(outcome.session, SessionState::Completed);
    let log = messages(&outcome);
    assert!(log[1].starts_with("Live stream unavailable"));
    assert_eq!(log.last(), Some(&"Results ready"));
    assert_eq!(log.iter().filter(|m| **m == "Results ready").count(), 1);
    assert!(temp.path().join("documentation.html").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_submission_fails_without_tracking() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orchestrate"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "orchestrator offline" })))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let outcome = run_console(&server, temp.path(), "Build a todo app").await;

    assert_eq!(outcome.session, SessionState::Failed);
    assert_eq!(
        outcome.log,
        vec![(LogLevel::Error, "Error: orchestrator offline".to_string())]
    );
    assert!(outcome.printed.contains("ERROR Error: orchestrator offline"));
}

#[tokio::test(flavor = "multi_thread")]
async fn blank_input_only_shows_notice() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let outcome = run_console(&server, temp.path(), "   ").await;

    assert_eq!(outcome.session, SessionState::Idle);
    assert!(outcome.log.is_empty());
    assert!(outcome
        .printed
        .contains("Please enter product requirements!"));
}
