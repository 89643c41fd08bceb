//! loadrun core library
//!
//! Orchestrates load-testing runs of a Docker-packaged k6 binary against a
//! named target environment: scenario dispatch, bounded concurrency,
//! sequential phase execution with fixed pauses, per-run results directories
//! and a `summary.json` record.
//!
//! ## Quick Start
//!
//! ```ignore
//! use loadrun_core::{K6Runner, RunConfig, Scenario};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig {
//!         environment: "staging".to_string(),
//!         target_url: RunConfig::resolve_target_url("staging", None)?,
//!         ..RunConfig::default()
//!     };
//!
//!     let runner = K6Runner::new(config);
//!     let summary = runner.run(Scenario::Smoke).await?;
//!     println!("{} phases, status {:?}", summary.phases.len(), summary.status);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod preflight;
pub mod report;
pub mod runner;
pub mod scenario;

// Re-exports
pub use config::RunConfig;
pub use error::{LoadError, LoadResult};
pub use logging::RunLogWriter;
pub use report::{Outcome, PhaseRecord, RunSummary};
pub use runner::K6Runner;
pub use scenario::{bounded_vus, scaled_vus, Phase, Scenario};
