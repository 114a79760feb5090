//! Grievance Orchestrator: runs one submission through the nine stages.
//!
//! Strategy is chosen once per run from the resolver. The remote path
//! animates the first three stages while the analyze call is in flight;
//! if that call fails the simulation path takes over on the same board,
//! filling in what the remote path left without moving any step backwards.

use crate::remote::{normalize, RemoteFailure, RemoteOutcome};
use crate::report::{RunReport, Strategy};
use crate::request::GrievanceRequest;
use crate::timing;
use chrono::Utc;
use dhruva_client::{AnalysisBackend, AnalyzeRequest, EndpointResolver, Resolution};
use dhruva_core::{
    generate_case_id, validate_text, BoardSnapshot, DhruvaError, DuplicateCheck, Pacer,
    PipelineResult, ResultSource, RunContext, StageId, StepBoard, StepOutcome, TokioPacer,
};
use dhruva_ledger::{AuditAction, AuditActor, AuditEntry, CommitOutcome, Ledger};
use dhruva_stages::Simulator;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

pub struct Orchestrator {
    resolver: Arc<EndpointResolver>,
    backend: Arc<dyn AnalysisBackend>,
    pub(crate) simulator: Arc<Simulator>,
    pacer: Arc<dyn Pacer>,
    rng: Mutex<StdRng>,
    board: StepBoard,
    ledger: Mutex<Ledger>,
    run_gate: tokio::sync::Mutex<()>,
    default_location: Option<String>,
}

impl Orchestrator {
    pub fn new(
        resolver: Arc<EndpointResolver>,
        backend: Arc<dyn AnalysisBackend>,
        simulator: Arc<Simulator>,
    ) -> Self {
        Self {
            resolver,
            backend,
            simulator,
            pacer: Arc::new(TokioPacer),
            rng: Mutex::new(StdRng::from_entropy()),
            board: StepBoard::new(),
            ledger: Mutex::new(Ledger::new()),
            run_gate: tokio::sync::Mutex::new(()),
            default_location: None,
        }
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Fixed RNG seed for reproducible case ids and simulated scores.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Location used when a request does not carry one.
    pub fn with_default_location(mut self, location: Option<String>) -> Self {
        self.default_location = location;
        self
    }

    pub fn with_ledger(mut self, ledger: Ledger) -> Self {
        self.ledger = Mutex::new(ledger);
        self
    }

    pub fn resolver(&self) -> &Arc<EndpointResolver> {
        &self.resolver
    }

    pub fn steps(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.board.subscribe()
    }

    /// Run a grievance end to end and commit the result.
    ///
    /// Invalid input is rejected before any state changes. Remote errors
    /// never surface here; they end in a simulated result.
    pub async fn submit(&self, request: GrievanceRequest) -> Result<RunReport, DhruvaError> {
        validate_text(&request.text)?;
        let _gate = self.run_gate.lock().await;

        let case_id = generate_case_id(&mut *self.rng(), Utc::now());
        let run_id = {
            let mut ledger = self.ledger();
            let run_id = self.board.begin_run();
            ledger.begin_run(run_id);
            run_id
        };
        let ctx = self.context_for(run_id, case_id, request);
        tracing::info!(run_id, case_id = %ctx.case_id, trace_id = %ctx.trace_id, "run started");

        self.ledger().record(
            run_id,
            AuditEntry::new(
                &ctx.case_id,
                AuditAction::Submitted,
                AuditActor::Citizen,
                format!("Grievance submitted: \"{}\"", preview(&ctx.text, 50)),
            ),
        );

        let (result, strategy) = match self.resolver.resolve().await {
            Resolution::Available(url) => match self.run_remote(&ctx, &url).await {
                Ok(result) => (result, Strategy::Remote { url }),
                Err(failure) => {
                    let reason = failure.to_string();
                    tracing::warn!(
                        run_id,
                        case_id = %ctx.case_id,
                        url = %url,
                        error = %reason,
                        "remote analysis failed, falling back to simulation"
                    );
                    self.resolver.status().record_remote_error(&reason);
                    let result = self.run_simulation(&ctx).await;
                    (result, Strategy::Fallback { url, reason })
                }
            },
            Resolution::Unavailable => (self.run_simulation(&ctx).await, Strategy::Simulation),
        };

        let needs_clarification = result.needs_clarification();
        let questions = if needs_clarification {
            self.simulator.clarifying_questions(
                &ctx.text,
                &result.classification.department,
                &result.classification.top3,
            )
        } else {
            Vec::new()
        };

        let outcome = self.ledger().commit(&ctx, result.clone(), questions.clone());
        tracing::info!(
            run_id,
            case_id = %ctx.case_id,
            source = %result.source,
            department = %result.classification.department,
            confidence = result.classification.confidence,
            outcome = ?outcome,
            "run finished"
        );

        Ok(RunReport {
            run_id,
            result,
            strategy,
            needs_clarification,
            questions,
            committed: outcome != CommitOutcome::Stale,
        })
    }

    /// Drop the active run: fresh pending steps, no result, empty audit
    /// trail. An in-flight run keeps going but can no longer write.
    pub fn reset(&self) -> u64 {
        let mut ledger = self.ledger();
        let run_id = self.board.reset();
        ledger.reset(run_id);
        tracing::info!(run_id, "pipeline reset");
        run_id
    }

    async fn run_remote(&self, ctx: &RunContext, url: &str) -> RemoteOutcome {
        let run = ctx.run_id;
        let request = AnalyzeRequest {
            text: ctx.text.clone(),
            citizen_id: ctx.citizen_id.clone(),
            location: ctx.location.clone(),
        };

        self.board.start(run, StageId::Duplicate);
        let backend = Arc::clone(&self.backend);
        let base = url.to_string();
        let call = tokio::spawn(async move { backend.analyze(&base, &request).await });

        let mut lead_in = timing::REMOTE_LEAD_IN.iter().peekable();
        while let Some((stage, pause_ms)) = lead_in.next() {
            self.pacer
                .pause(std::time::Duration::from_millis(*pause_ms))
                .await;
            self.board
                .complete(run, *stage, StepOutcome::new(timing::reported_secs(*stage)));
            let next = lead_in.peek().map(|(s, _)| *s).unwrap_or(StageId::Sla);
            self.board.start(run, next);
        }

        let response = call
            .await
            .map_err(|e| RemoteFailure::Aborted(e.to_string()))??;
        let result = normalize(ctx, response);

        // Payloads for the stages animated before the response arrived
        self.board.complete(
            run,
            StageId::Duplicate,
            StepOutcome::default().with_result(payload(&result.duplicate_check)),
        );
        self.board.complete(
            run,
            StageId::Classify,
            StepOutcome::default()
                .with_result(payload(&result.classification))
                .with_confidence(result.classification.confidence),
        );
        self.board.complete(
            run,
            StageId::Sentiment,
            StepOutcome::default()
                .with_result(payload(&result.sentiment))
                .with_confidence(result.sentiment.confidence),
        );
        self.ledger().record(run, analyzed_entry(&result));

        self.finish_step(run, StageId::Sla, payload(&result.sla), None);

        self.board.start(run, StageId::Lapse);
        self.pacer.pause(timing::REMOTE_TAIL_PAUSE).await;
        self.finish_step(
            run,
            StageId::Lapse,
            payload(&result.lapse_risk),
            Some(result.lapse_risk.score),
        );

        self.board.start(run, StageId::Similar);
        self.pacer.pause(timing::REMOTE_TAIL_PAUSE).await;
        self.finish_step(
            run,
            StageId::Similar,
            json!({ "matches": result.similar_cases.len() }),
            None,
        );

        if ctx.location.is_some() {
            self.finish_step(
                run,
                StageId::Alerts,
                json!({ "alerts": payload(&result.proactive_alerts) }),
                None,
            );
        } else {
            self.board.skip(run, StageId::Alerts, "no location supplied");
        }
        self.finish_step(
            run,
            StageId::Template,
            json!({ "templateType": result.sentiment.distress_level }),
            None,
        );
        self.finish_step(
            run,
            StageId::Actions,
            json!({ "actions": result.recommended_actions }),
            None,
        );

        Ok(result)
    }

    async fn run_simulation(&self, ctx: &RunContext) -> PipelineResult {
        let run = ctx.run_id;
        let sim = Arc::clone(&self.simulator);

        self.begin_step(run, StageId::Duplicate).await;
        let duplicate_check: DuplicateCheck = {
            let ledger = self.ledger();
            sim.duplicate(&ctx.text, ledger.queue().texts())
        };
        self.finish_step(run, StageId::Duplicate, payload(&duplicate_check), None);

        self.begin_step(run, StageId::Classify).await;
        let classification = sim.classify(&ctx.text, &mut *self.rng());
        self.finish_step(
            run,
            StageId::Classify,
            payload(&classification),
            Some(classification.confidence),
        );

        self.begin_step(run, StageId::Sentiment).await;
        let sentiment = sim.distress(&ctx.text);
        self.finish_step(
            run,
            StageId::Sentiment,
            payload(&sentiment),
            Some(sentiment.confidence),
        );

        self.begin_step(run, StageId::Sla).await;
        let sla = sim.sla(sentiment.distress_level, ctx.submitted_at);
        self.finish_step(run, StageId::Sla, payload(&sla), None);

        self.begin_step(run, StageId::Lapse).await;
        let lapse_risk = sim.lapse(&mut *self.rng());
        self.finish_step(
            run,
            StageId::Lapse,
            payload(&lapse_risk),
            Some(sim.lapse_model_accuracy()),
        );

        self.begin_step(run, StageId::Similar).await;
        let similar_cases = sim.similar(&mut *self.rng());
        self.finish_step(
            run,
            StageId::Similar,
            json!({ "matches": similar_cases.len() }),
            None,
        );

        self.begin_step(run, StageId::Alerts).await;
        let proactive_alerts = match sim.alerts(ctx.location.as_deref()) {
            Some(alerts) => {
                self.finish_step(run, StageId::Alerts, json!({ "alerts": payload(&alerts) }), None);
                alerts
            }
            None => {
                self.board.skip(run, StageId::Alerts, "no location supplied");
                Vec::new()
            }
        };

        self.begin_step(run, StageId::Template).await;
        let response_template = sim.template(sentiment.distress_level, &ctx.case_id);
        self.finish_step(
            run,
            StageId::Template,
            json!({ "templateType": sentiment.distress_level }),
            None,
        );

        self.begin_step(run, StageId::Actions).await;
        let recommended_actions = sim.actions(
            sentiment.distress_level,
            classification.confidence,
            lapse_risk.score,
            similar_cases.len(),
        );
        self.finish_step(
            run,
            StageId::Actions,
            json!({ "actions": recommended_actions }),
            None,
        );

        let result = PipelineResult {
            case_id: ctx.case_id.clone(),
            classification,
            sentiment,
            sla,
            lapse_risk,
            duplicate_check,
            similar_cases,
            proactive_alerts,
            recommended_actions,
            response_template,
            source: ResultSource::Simulation,
        };
        self.ledger().record(run, analyzed_entry(&result));
        result
    }

    /// `pending → processing`, then pace. Steps the remote path already
    /// moved are not paced again.
    async fn begin_step(&self, run: u64, stage: StageId) {
        if self.board.start(run, stage) {
            self.pacer.pause(timing::simulation_pause(stage)).await;
        }
    }

    fn finish_step(&self, run: u64, stage: StageId, result: Value, confidence: Option<f64>) {
        let mut outcome = StepOutcome::new(timing::reported_secs(stage)).with_result(result);
        if let Some(confidence) = confidence {
            outcome = outcome.with_confidence(confidence);
        }
        self.board.complete(run, stage, outcome);
    }

    fn context_for(&self, run_id: u64, case_id: String, request: GrievanceRequest) -> RunContext {
        let GrievanceRequest {
            text,
            citizen_name,
            citizen_id,
            location,
            district,
            mandal,
        } = request;

        let mut ctx = RunContext::new(run_id, case_id, text)
            .with_location(location.or_else(|| self.default_location.clone()));
        if let Some(name) = citizen_name.filter(|n| !n.trim().is_empty()) {
            ctx = ctx.with_citizen(name, citizen_id);
        } else if citizen_id.is_some() {
            let name = ctx.citizen_name.clone();
            ctx = ctx.with_citizen(name, citizen_id);
        }
        if let (Some(district), Some(mandal)) = (district, mandal) {
            ctx = ctx.with_area(district, mandal);
        }
        ctx
    }

    pub(crate) fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn analyzed_entry(result: &PipelineResult) -> AuditEntry {
    let tag = match result.source {
        ResultSource::Api => "[REAL ML]",
        ResultSource::Simulation => "[SIMULATION]",
    };
    AuditEntry::new(
        &result.case_id,
        AuditAction::AiAnalyzed,
        AuditActor::Ai,
        format!(
            "{} Classified: {} ({:.1}%), Distress: {}",
            tag,
            result.classification.department,
            result.classification.confidence * 100.0,
            result.sentiment.distress_level
        ),
    )
    .with_context(json!({ "pipeline_step": StageId::Classify.id() }))
}

fn payload<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("short text", 50), "short text");
        let long = "x".repeat(60);
        assert_eq!(preview(&long, 50), format!("{}...", "x".repeat(50)));
        // Counts characters, not bytes
        assert_eq!(preview("పెన్షన్ రాలేదు", 3).chars().count(), 6);
    }
}
