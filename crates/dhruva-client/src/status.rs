//! Diagnostic view of backend availability.
//!
//! Written by the resolver and the orchestrator, read by the HTTP layer.
//! Nothing here affects which path a run takes.
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

pub const UNAVAILABLE_MESSAGE: &str = "Backend not available - using simulation mode";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackendSnapshot {
    pub available: bool,
    pub url: Option<String>,
    pub last_error: Option<String>,
    pub checked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct BackendStatus {
    inner: Mutex<BackendSnapshot>,
}

impl BackendStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> BackendSnapshot {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn record_available(&self, url: &str) {
        self.update(|s| {
            s.available = true;
            s.url = Some(url.to_string());
            s.last_error = None;
        });
    }

    pub fn record_unavailable(&self) {
        self.update(|s| {
            s.available = false;
            s.url = None;
            s.last_error = Some(UNAVAILABLE_MESSAGE.to_string());
        });
    }

    /// A remote call failed after the backend was resolved.
    pub fn record_remote_error(&self, message: &str) {
        self.update(|s| {
            s.last_error = Some(format!("API error: {} - using simulation", message));
        });
    }

    fn update(&self, f: impl FnOnce(&mut BackendSnapshot)) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
        guard.checked_at = Some(Utc::now());
    }
}
