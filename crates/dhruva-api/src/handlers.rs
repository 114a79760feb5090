//! API Handlers
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use dhruva_core::{CaseStatus, DHRUVA_VERSION};
use dhruva_orchestrator::{GrievanceRequest, RunReport};
use serde::Deserialize;
use serde_json::{json, Value};

/// The run is spawned so a dropped connection cannot abandon it half-way.
pub async fn submit(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GrievanceRequest>,
) -> ApiResult<Json<RunReport>> {
    let orchestrator = state.orchestrator.clone();
    let report = tokio::spawn(async move { orchestrator.submit(request).await })
        .await
        .map_err(|e| ApiError::internal(format!("run aborted: {}", e)))??;

    state.metrics.observe_run(&report);
    Ok(Json(report))
}

pub async fn reset(State(state): State<AppState>) -> Json<Value> {
    let run_id = state.orchestrator.reset();
    Json(json!({ "run_id": run_id }))
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackBody {
    #[serde(default)]
    pub feedback: Option<String>,
}

pub async fn accept(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<FeedbackBody>,
) -> ApiResult<Json<Value>> {
    state.orchestrator.accept(body.feedback.as_deref())?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct ReassignBody {
    pub department: String,
    #[serde(default)]
    pub feedback: Option<String>,
}

pub async fn reassign(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ReassignBody>,
) -> ApiResult<Json<Value>> {
    let previous = state
        .orchestrator
        .reassign(&body.department, body.feedback.as_deref())?;
    Ok(Json(json!({
        "previous_department": previous,
        "department": body.department,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ResolveBody {
    pub resolution: String,
}

pub async fn resolve_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    ApiJson(body): ApiJson<ResolveBody>,
) -> ApiResult<Json<Value>> {
    state.orchestrator.resolve_case(&case_id, &body.resolution)?;
    Ok(Json(json!({ "case_id": case_id, "status": CaseStatus::Resolved })))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: CaseStatus,
}

pub async fn set_case_status(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    ApiJson(body): ApiJson<StatusBody>,
) -> ApiResult<Json<Value>> {
    let previous = state.orchestrator.set_case_status(&case_id, body.status)?;
    Ok(Json(json!({
        "case_id": case_id,
        "previous_status": previous,
        "status": body.status,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ClarificationBody {
    pub question: String,
    pub department: String,
}

pub async fn answer_clarification(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ClarificationBody>,
) -> ApiResult<Json<Value>> {
    state
        .orchestrator
        .answer_clarification(&body.question, &body.department)?;
    Ok(Json(json!({ "department": body.department })))
}

pub async fn skip_clarification(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.orchestrator.skip_clarification()?;
    Ok(Json(json!({ "success": true })))
}

pub async fn steps(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.orchestrator.steps())
}

pub async fn result(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.orchestrator.session())
}

pub async fn cases(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "cases": state.orchestrator.cases(),
        "submitted": state.orchestrator.submitted(),
    }))
}

pub async fn get_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let record = state
        .orchestrator
        .case(&case_id)
        .ok_or_else(|| ApiError::not_found(format!("case {}", case_id)))?;
    Ok(Json(json!(record)))
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    #[serde(default)]
    pub case_id: Option<String>,
}

pub async fn audit(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Json<Value> {
    let entries = match query.case_id.as_deref() {
        Some(case_id) => state.orchestrator.audit_for_case(case_id),
        None => state.orchestrator.audit(),
    };
    Json(json!({
        "entries": entries,
        "stats": state.orchestrator.audit_stats(),
    }))
}

/// Full trail as JSON Lines.
pub async fn audit_export(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        state.orchestrator.audit_jsonl(),
    )
}

pub async fn backend(State(state): State<AppState>) -> Json<Value> {
    let orchestrator = &state.orchestrator;
    Json(json!({
        "status": orchestrator.backend_status(),
        "candidates": orchestrator.resolver().candidates(),
        "cached_url": orchestrator.resolver().cached_url(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct OverrideBody {
    pub url: String,
}

pub async fn override_backend(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<OverrideBody>,
) -> ApiResult<Json<Value>> {
    let resolver = state.orchestrator.resolver();
    resolver
        .override_url(&body.url)
        .map_err(|e| ApiError::validation(e.to_string()))?;
    Ok(Json(json!({ "candidates": resolver.candidates() })))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let backend = state.orchestrator.backend_status();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": DHRUVA_VERSION,
            "backend_available": backend.available,
        })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state
        .metrics
        .set_backend_available(state.orchestrator.backend_status().available);
    let body = state
        .metrics
        .encode()
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
