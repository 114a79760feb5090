//! Prometheus metrics served at `/metrics`.
use dhruva_orchestrator::RunReport;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    runs: IntCounterVec,
    fallbacks: IntCounter,
    backend_available: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let runs = IntCounterVec::new(
            Opts::new("dhruva_runs_total", "Completed pipeline runs by result source"),
            &["source"],
        )?;
        let fallbacks = IntCounter::new(
            "dhruva_remote_fallbacks_total",
            "Runs where the remote backend failed and the simulation finished",
        )?;
        let backend_available = IntGauge::new(
            "dhruva_backend_available",
            "1 when the last resolve found a healthy backend",
        )?;

        registry.register(Box::new(runs.clone()))?;
        registry.register(Box::new(fallbacks.clone()))?;
        registry.register(Box::new(backend_available.clone()))?;

        Ok(Self {
            registry,
            runs,
            fallbacks,
            backend_available,
        })
    }

    pub fn observe_run(&self, report: &RunReport) {
        self.runs
            .with_label_values(&[report.result.source.as_str()])
            .inc();
        if report.fell_back() {
            self.fallbacks.inc();
        }
    }

    pub fn set_backend_available(&self, available: bool) {
        self.backend_available.set(i64::from(available));
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
