//! Run summary serialization.
//!
//! `summary.json` is the one record of what a run did: the configuration
//! scalars, per-phase outcomes, and the overall status. It is written once,
//! at the end of the run (or at the first failing phase), and never read
//! back by loadrun itself.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::error::LoadResult;
use crate::scenario::Phase;

/// Filename of the run summary inside the results directory.
pub const SUMMARY_FILE: &str = "summary.json";

/// Outcome of a phase or of the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Exited zero
    Passed,
    /// Exited non-zero (or was killed)
    Failed,
}

/// Record of one executed phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRecord {
    /// Phase name
    pub name: String,
    /// Script the runner executed
    pub script: String,
    /// Effective VU count
    pub vus: u32,
    /// Phase duration in seconds
    pub duration_secs: u64,
    /// Runner exit code (-1 if killed by a signal)
    pub exit_code: i32,
    /// Phase outcome
    pub status: Outcome,
    /// Filename of the runner's summary export inside the results directory
    pub output_file: String,
}

impl PhaseRecord {
    /// Build a record from an executed phase.
    pub fn new(phase: &Phase, exit_code: i32, output_file: String) -> Self {
        Self {
            name: phase.name.clone(),
            script: phase.script.clone(),
            vus: phase.vus,
            duration_secs: phase.duration_secs,
            exit_code,
            status: if exit_code == 0 {
                Outcome::Passed
            } else {
                Outcome::Failed
            },
            output_file,
        }
    }
}

/// Run metadata and per-phase outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Target environment name
    pub environment: String,
    /// Scenario that ran
    pub scenario: String,
    /// Resolved base URL the test scripts hit
    pub target_url: String,
    /// Concurrency ceiling in effect
    pub max_vus: u32,
    /// Runner container image
    pub image: String,
    /// Run timestamp (directory name component)
    pub timestamp: String,
    /// RFC 3339 start time
    pub started_at: String,
    /// RFC 3339 finish time, set by `finish`
    pub finished_at: Option<String>,
    /// Overall run outcome, set by `finish`
    pub status: Outcome,
    /// Executed phases, in order
    pub phases: Vec<PhaseRecord>,
}

impl RunSummary {
    /// Start a summary for a run beginning now.
    pub fn new(config: &RunConfig, scenario: &str) -> Self {
        Self {
            environment: config.environment.clone(),
            scenario: scenario.to_string(),
            target_url: config.target_url.clone(),
            max_vus: config.max_vus,
            image: config.image.clone(),
            timestamp: config.timestamp.clone(),
            started_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            finished_at: None,
            status: Outcome::Passed,
            phases: Vec::new(),
        }
    }

    /// Append a phase record.
    pub fn record(&mut self, record: PhaseRecord) {
        self.phases.push(record);
    }

    /// Stamp the finish time and overall outcome.
    pub fn finish(&mut self, status: Outcome) {
        self.finished_at =
            Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
        self.status = status;
    }

    /// Write `summary.json` into the results directory, returning its path.
    pub fn write(&self, results_dir: &Path) -> LoadResult<PathBuf> {
        let path = results_dir.join(SUMMARY_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_phase() -> Phase {
        Phase {
            name: "smoke".to_string(),
            script: "smoke.js".to_string(),
            vus: 5,
            duration_secs: 30,
            pause_after_secs: 0,
        }
    }

    #[test]
    fn test_phase_record_status_follows_exit_code() {
        let ok = PhaseRecord::new(&sample_phase(), 0, "01-smoke.json".to_string());
        assert_eq!(ok.status, Outcome::Passed);

        let bad = PhaseRecord::new(&sample_phase(), 7, "01-smoke.json".to_string());
        assert_eq!(bad.status, Outcome::Failed);
        assert_eq!(bad.exit_code, 7);
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let config = RunConfig::default();

        let mut summary = RunSummary::new(&config, "smoke");
        summary.record(PhaseRecord::new(&sample_phase(), 0, "01-smoke.json".to_string()));
        summary.finish(Outcome::Passed);

        let path = summary.write(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), SUMMARY_FILE);

        let json = std::fs::read_to_string(&path).unwrap();
        let parsed: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.scenario, "smoke");
        assert_eq!(parsed.phases.len(), 1);
        assert_eq!(parsed.status, Outcome::Passed);
        assert!(parsed.finished_at.is_some());
    }

    #[test]
    fn test_outcome_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Outcome::Passed).unwrap(), "\"passed\"");
        assert_eq!(serde_json::to_string(&Outcome::Failed).unwrap(), "\"failed\"");
    }
}
