//! Dhruva Client: remote ML backend access.
//!
//! - [`EndpointConfig`] builds the ordered candidate list
//! - [`EndpointResolver`] picks a healthy candidate and caches it
//! - [`ApiClient`] speaks the backend's `/api/v1/ml/*` JSON protocol
//! - [`BackendStatus`] records availability for diagnostics only

pub mod backend;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod resolver;
pub mod status;
pub mod wire;

pub use backend::{AnalysisBackend, HealthProbe, ProbeOutcome};
pub use client::{ApiClient, ANALYZE_TIMEOUT};
pub use endpoints::EndpointConfig;
pub use error::ClientError;
pub use resolver::{EndpointResolver, Resolution};
pub use status::{BackendSnapshot, BackendStatus};
pub use wire::{AnalyzeRequest, AnalyzeResponse, HealthResponse};
