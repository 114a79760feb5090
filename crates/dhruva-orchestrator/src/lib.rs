//! Dhruva Orchestrator
//!
//! Drives a grievance through the nine analysis stages using the remote
//! backend when one resolves, and the local simulation otherwise or after a
//! remote failure. Results are committed to the ledger only while their run
//! is still current.

pub mod remote;
pub mod report;
pub mod request;
pub mod review;
pub mod runner;
pub mod timing;

pub use remote::{RemoteFailure, RemoteOutcome};
pub use report::{RunReport, Strategy};
pub use request::GrievanceRequest;
pub use runner::Orchestrator;
