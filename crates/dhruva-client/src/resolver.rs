//! Endpoint resolver: finds a working backend URL and caches it.
//!
//! `resolve()` first re-probes the cached URL with a short timeout; on
//! failure the cache is cleared and every candidate is probed in order with
//! a longer timeout. The first healthy candidate becomes the cache.
//! Concurrent callers may each probe; whichever finishes last wins the cache.
use crate::backend::{HealthProbe, ProbeOutcome};
use crate::endpoints::normalize_url;
use crate::error::ClientError;
use crate::status::BackendStatus;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const CACHED_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
pub const CANDIDATE_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Available(String),
    Unavailable,
}

impl Resolution {
    pub fn url(&self) -> Option<&str> {
        match self {
            Resolution::Available(url) => Some(url),
            Resolution::Unavailable => None,
        }
    }
}

pub struct EndpointResolver {
    candidates: RwLock<Vec<String>>,
    cached: RwLock<Option<String>>,
    probe: Arc<dyn HealthProbe>,
    status: Arc<BackendStatus>,
    cached_timeout: Duration,
    candidate_timeout: Duration,
}

impl EndpointResolver {
    pub fn new(candidates: Vec<String>, probe: Arc<dyn HealthProbe>) -> Result<Self, ClientError> {
        if candidates.is_empty() {
            return Err(ClientError::Config(
                "at least one backend candidate is required".to_string(),
            ));
        }
        Ok(Self {
            candidates: RwLock::new(candidates),
            cached: RwLock::new(None),
            probe,
            status: Arc::new(BackendStatus::new()),
            cached_timeout: CACHED_PROBE_TIMEOUT,
            candidate_timeout: CANDIDATE_PROBE_TIMEOUT,
        })
    }

    pub fn with_timeouts(mut self, cached: Duration, candidate: Duration) -> Self {
        self.cached_timeout = cached;
        self.candidate_timeout = candidate;
        self
    }

    pub fn status(&self) -> Arc<BackendStatus> {
        Arc::clone(&self.status)
    }

    pub fn candidates(&self) -> Vec<String> {
        self.candidates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn cached_url(&self) -> Option<String> {
        self.cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn resolve(&self) -> Resolution {
        if let Some(url) = self.cached_url() {
            match self.probe.probe(&url, self.cached_timeout).await {
                ProbeOutcome::Healthy => {
                    self.status.record_available(&url);
                    return Resolution::Available(url);
                }
                ProbeOutcome::Unhealthy(reason) => {
                    tracing::warn!(url = %url, reason = %reason, "cached backend failed health check");
                    self.set_cached(None);
                }
            }
        }

        for url in self.candidates() {
            match self.probe.probe(&url, self.candidate_timeout).await {
                ProbeOutcome::Healthy => {
                    tracing::info!(url = %url, "backend resolved");
                    self.set_cached(Some(url.clone()));
                    self.status.record_available(&url);
                    return Resolution::Available(url);
                }
                ProbeOutcome::Unhealthy(reason) => {
                    tracing::debug!(url = %url, reason = %reason, "candidate unavailable");
                }
            }
        }

        tracing::warn!("no backend candidate reachable");
        self.status.record_unavailable();
        Resolution::Unavailable
    }

    /// Put `url` at the front of the candidate list and drop the cache so
    /// the next resolve probes it first.
    pub fn override_url(&self, url: &str) -> Result<(), ClientError> {
        let url = normalize_url(url);
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientError::Config(format!("not an http(s) url: {}", url)));
        }
        {
            let mut candidates = self
                .candidates
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            candidates.retain(|c| c != &url);
            candidates.insert(0, url.clone());
        }
        self.set_cached(None);
        tracing::info!(url = %url, "backend override installed");
        Ok(())
    }

    /// Re-resolve on a fixed interval until the handle is aborted.
    pub fn spawn_refresh(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let resolution = self.resolve().await;
                tracing::debug!(available = resolution.url().is_some(), "backend refresh");
            }
        })
    }

    fn set_cached(&self, url: Option<String>) {
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = url;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Healthy set is mutable; every probe is recorded.
    #[derive(Default)]
    struct FakeProbe {
        healthy: Mutex<HashSet<String>>,
        calls: Mutex<Vec<(String, Duration)>>,
    }

    impl FakeProbe {
        fn with_healthy(urls: &[&str]) -> Arc<Self> {
            let probe = Self::default();
            probe
                .healthy
                .lock()
                .unwrap()
                .extend(urls.iter().map(|u| u.to_string()));
            Arc::new(probe)
        }

        fn set_healthy(&self, urls: &[&str]) {
            let mut healthy = self.healthy.lock().unwrap();
            healthy.clear();
            healthy.extend(urls.iter().map(|u| u.to_string()));
        }

        fn take_calls(&self) -> Vec<(String, Duration)> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    #[async_trait]
    impl HealthProbe for FakeProbe {
        async fn probe(&self, base_url: &str, timeout: Duration) -> ProbeOutcome {
            self.calls
                .lock()
                .unwrap()
                .push((base_url.to_string(), timeout));
            if self.healthy.lock().unwrap().contains(base_url) {
                ProbeOutcome::Healthy
            } else {
                ProbeOutcome::Unhealthy("refused".to_string())
            }
        }
    }

    fn urls() -> Vec<String> {
        vec!["http://a".to_string(), "http://b".to_string(), "http://c".to_string()]
    }

    #[tokio::test]
    async fn test_first_healthy_candidate_cached() {
        let probe = FakeProbe::with_healthy(&["http://b", "http://c"]);
        let resolver = EndpointResolver::new(urls(), probe.clone()).unwrap();

        assert_eq!(resolver.resolve().await, Resolution::Available("http://b".to_string()));
        assert_eq!(resolver.cached_url().as_deref(), Some("http://b"));
        let calls = probe.take_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(_, t)| *t == CANDIDATE_PROBE_TIMEOUT));
    }

    #[tokio::test]
    async fn test_cached_url_probed_alone() {
        let probe = FakeProbe::with_healthy(&["http://b"]);
        let resolver = EndpointResolver::new(urls(), probe.clone()).unwrap();
        resolver.resolve().await;
        probe.take_calls();

        assert_eq!(resolver.resolve().await, Resolution::Available("http://b".to_string()));
        assert_eq!(
            probe.take_calls(),
            vec![("http://b".to_string(), CACHED_PROBE_TIMEOUT)]
        );
    }

    #[tokio::test]
    async fn test_cache_cleared_on_failure() {
        let probe = FakeProbe::with_healthy(&["http://b"]);
        let resolver = EndpointResolver::new(urls(), probe.clone()).unwrap();
        resolver.resolve().await;

        probe.set_healthy(&["http://c"]);
        assert_eq!(resolver.resolve().await, Resolution::Available("http://c".to_string()));
        assert_eq!(resolver.cached_url().as_deref(), Some("http://c"));
    }

    #[tokio::test]
    async fn test_all_unhealthy() {
        let probe = FakeProbe::with_healthy(&[]);
        let resolver = EndpointResolver::new(urls(), probe.clone()).unwrap();

        assert_eq!(resolver.resolve().await, Resolution::Unavailable);
        assert!(resolver.cached_url().is_none());
        assert_eq!(probe.take_calls().len(), 3);
        assert!(!resolver.status().snapshot().available);
    }

    #[tokio::test]
    async fn test_override_goes_first() {
        let probe = FakeProbe::with_healthy(&["http://a", "http://z"]);
        let resolver = EndpointResolver::new(urls(), probe.clone()).unwrap();
        resolver.resolve().await;
        assert_eq!(resolver.cached_url().as_deref(), Some("http://a"));

        resolver.override_url("http://z/").unwrap();
        assert!(resolver.cached_url().is_none());
        assert_eq!(resolver.candidates()[0], "http://z");
        assert_eq!(resolver.resolve().await, Resolution::Available("http://z".to_string()));

        assert!(resolver.override_url("ftp://nope").is_err());
    }

    #[test]
    fn test_empty_candidates_rejected() {
        let probe = FakeProbe::with_healthy(&[]);
        assert!(EndpointResolver::new(vec![], probe).is_err());
    }
}
