//! HTTP surface tests driven through the router without a socket.
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use dhruva_api::{create_app, AppState};
use dhruva_client::{
    AnalysisBackend, AnalyzeRequest, AnalyzeResponse, ClientError, EndpointResolver, HealthProbe,
    ProbeOutcome,
};
use dhruva_core::InstantPacer;
use dhruva_orchestrator::Orchestrator;
use dhruva_stages::Simulator;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const PENSION: &str = "My old age pension has not come for three months, please help";

const ABSENT_CASE: &str = "PGRS-20251126-ZZ99";

struct FixedProbe(bool);

#[async_trait]
impl HealthProbe for FixedProbe {
    async fn probe(&self, _base_url: &str, _timeout: Duration) -> ProbeOutcome {
        if self.0 {
            ProbeOutcome::Healthy
        } else {
            ProbeOutcome::Unhealthy("connection refused".to_string())
        }
    }
}

/// Answers every analyze call with the same response, or fails if none.
struct ScriptedBackend(Option<AnalyzeResponse>);

#[async_trait]
impl AnalysisBackend for ScriptedBackend {
    async fn analyze(
        &self,
        _base_url: &str,
        _request: &AnalyzeRequest,
    ) -> Result<AnalyzeResponse, ClientError> {
        self.0
            .clone()
            .ok_or_else(|| ClientError::Connection("unreachable".to_string()))
    }
}

fn low_confidence_analysis() -> AnalyzeResponse {
    serde_json::from_value(json!({
        "classification": {
            "department": "Social Welfare",
            "confidence": 0.5,
            "method": "fallback_classifier",
            "top_3": [
                { "department": "Social Welfare", "confidence": 0.5 },
                { "department": "Civil Supplies", "confidence": 0.42 }
            ]
        },
        "sentiment": { "distress_level": "HIGH", "confidence": 0.9, "signals": [] },
        "lapse_prediction": { "risk_score": 0.3, "risk_level": "LOW", "likely_lapses": [] },
        "sla": { "hours": 72, "deadline": "2025-11-29T08:30:00Z", "priority": "HIGH" }
    }))
    .unwrap()
}

fn app() -> Router {
    app_with(false, None)
}

fn app_with(healthy: bool, response: Option<AnalyzeResponse>) -> Router {
    let resolver = Arc::new(
        EndpointResolver::new(
            vec!["http://backend.test".to_string()],
            Arc::new(FixedProbe(healthy)),
        )
        .unwrap(),
    );
    let orchestrator = Orchestrator::new(
        resolver,
        Arc::new(ScriptedBackend(response)),
        Arc::new(Simulator::builtin().unwrap()),
    )
    .with_pacer(Arc::new(InstantPacer))
    .with_seed(7);
    create_app(AppState::new(Arc::new(orchestrator)).unwrap())
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(b) => Body::from(b.to_string()),
            None => Body::empty(),
        })
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_submit_simulates_and_queues() {
    let app = app();

    let (status, report) = call(&app, "POST", "/v1/grievances", Some(json!({ "text": PENSION }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["strategy"]["kind"], "simulation");
    assert_eq!(report["committed"], true);
    assert_eq!(report["result"]["classification"]["department"], "Social Welfare");

    let (_, cases) = call(&app, "GET", "/v1/cases", None).await;
    assert_eq!(cases["cases"].as_array().unwrap().len(), 1);

    let (_, steps) = call(&app, "GET", "/v1/pipeline/steps", None).await;
    assert_eq!(steps["steps"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn test_malformed_bodies_use_error_shape() {
    let app = app();

    let (status, body) = call(&app, "POST", "/v1/grievances", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("text"));

    let request = Request::builder()
        .method("POST")
        .uri("/v1/grievances")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_short_text_rejected() {
    let app = app();
    let (status, body) = call(&app, "POST", "/v1/grievances", Some(json!({ "text": "help" }))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, audit) = call(&app, "GET", "/v1/audit", None).await;
    assert!(audit["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_review_without_result_conflicts() {
    let app = app();
    let (status, body) = call(&app, "POST", "/v1/cases/accept", Some(json!({}))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "STATE_CONFLICT");
}

#[tokio::test]
async fn test_unknown_case_not_found() {
    let app = app();
    let (status, _) = call(
        &app,
        "POST",
        &format!("/v1/cases/{}/resolve", ABSENT_CASE),
        Some(json!({ "resolution": "paid" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "GET", &format!("/v1/cases/{}", ABSENT_CASE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_accept_then_resolve() {
    let app = app();
    let (_, report) = call(&app, "POST", "/v1/grievances", Some(json!({ "text": PENSION }))).await;
    let case_id = report["result"]["case_id"].as_str().unwrap().to_string();

    if report["needs_clarification"] == true {
        let (status, _) = call(&app, "POST", "/v1/clarification/skip", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = call(&app, "POST", "/v1/cases/accept", Some(json!({ "feedback": "ok" }))).await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/v1/cases/{}/resolve", case_id);
    let (status, body) = call(&app, "POST", &uri, Some(json!({ "resolution": "Pension released" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "resolved");
}

#[tokio::test]
async fn test_backend_override_validates_scheme() {
    let app = app();
    let (status, _) = call(&app, "POST", "/v1/backend/override", Some(json!({ "url": "ftp://x" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = call(
        &app,
        "POST",
        "/v1/backend/override",
        Some(json!({ "url": "https://ml.example.org" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["candidates"][0], "https://ml.example.org");
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = app();
    let (status, health) = call(&app, "GET", "/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["backend_available"], false);

    call(&app, "POST", "/v1/grievances", Some(json!({ "text": PENSION }))).await;

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("dhruva_runs_total{source=\"simulation\"} 1"));
    assert!(text.contains("dhruva_backend_available 0"));
}

#[tokio::test]
async fn test_request_id_echoed_or_generated() {
    let app = app();

    let request = Request::builder()
        .uri("/v1/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let request = Request::builder().uri("/v1/health").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 36);
}

#[tokio::test]
async fn test_case_status_transitions() {
    let app = app();
    let (_, report) = call(&app, "POST", "/v1/grievances", Some(json!({ "text": PENSION }))).await;
    let uri = format!("/v1/cases/{}/status", report["result"]["case_id"].as_str().unwrap());

    let (status, body) = call(&app, "POST", &uri, Some(json!({ "status": "in_progress" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["previous_status"], "pending");
    assert_eq!(body["status"], "in_progress");

    let (status, body) = call(&app, "POST", &uri, Some(json!({ "status": "reopened" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "STATE_CONFLICT");

    let (status, _) = call(&app, "POST", &uri, Some(json!({ "status": "archived" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_clarification_answer_reroutes() {
    let app = app_with(true, Some(low_confidence_analysis()));

    let (status, report) = call(&app, "POST", "/v1/grievances", Some(json!({ "text": PENSION }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["strategy"]["kind"], "remote");
    assert_eq!(report["needs_clarification"], true);
    let case_id = report["result"]["case_id"].as_str().unwrap().to_string();

    let (status, _) = call(&app, "POST", "/v1/cases/accept", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(
        &app,
        "POST",
        "/v1/clarification",
        Some(json!({ "question": "Is this about ration supply?", "department": "Civil Supplies" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["department"], "Civil Supplies");

    let (_, session) = call(&app, "GET", "/v1/pipeline/result", None).await;
    assert_eq!(session["result"]["classification"]["department"], "Civil Supplies");
    assert_eq!(session["result"]["classification"]["confidence"], 0.5);

    let (status, _) = call(&app, "POST", "/v1/clarification/skip", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(&app, "POST", "/v1/cases/accept", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/v1/audit?case_id={}", case_id);
    let (_, audit) = call(&app, "GET", &uri, None).await;
    let actions: Vec<&str> = audit["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, ["SUBMITTED", "AI_ANALYZED", "CLARIFIED", "ACCEPTED"]);
}

#[tokio::test]
async fn test_audit_export_jsonl() {
    let app = app();
    call(&app, "POST", "/v1/grievances", Some(json!({ "text": PENSION }))).await;

    let request = Request::builder().uri("/v1/audit/export").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/x-ndjson");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let first: Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    assert_eq!(first["action"], "SUBMITTED");

    let uri = format!("/v1/audit?case_id={}", ABSENT_CASE);
    let (_, audit) = call(&app, "GET", &uri, None).await;
    assert!(audit["entries"].as_array().unwrap().is_empty());
}
