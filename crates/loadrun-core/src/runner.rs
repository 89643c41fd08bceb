//! Containerized runner invocation and phase sequencing.
//!
//! One `K6Runner` drives one run: it creates the results directory, executes
//! each phase of the selected scenario as a `docker run` invocation, captures
//! runner output into `run.log`, pauses between phases, and writes the
//! summary. The first failing phase aborts the remaining sequence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;

use crate::config::RunConfig;
use crate::error::{LoadError, LoadResult};
use crate::logging::RunLogWriter;
use crate::report::{Outcome, PhaseRecord, RunSummary};
use crate::scenario::{Phase, Scenario};

/// Mount point of the scripts directory inside the container.
const SCRIPTS_MOUNT: &str = "/scripts";
/// Mount point of the results directory inside the container.
const RESULTS_MOUNT: &str = "/results";

/// Sequential executor for a scenario's phases.
pub struct K6Runner {
    config: RunConfig,
}

impl K6Runner {
    /// Create a runner for the given configuration.
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// The configuration this runner was built with.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Host-side filename of a phase's runner summary export.
    pub fn output_file_name(index: usize, phase: &Phase) -> String {
        format!("{:02}-{}.json", index + 1, phase.name)
    }

    /// Argument vector for one phase's `docker run` invocation.
    ///
    /// Pure so the dispatch can be asserted without spawning anything. The
    /// mounts use absolute host paths; `BASE_URL` is handed to the scripts
    /// through the container environment.
    pub fn command_args(
        &self,
        index: usize,
        phase: &Phase,
        scripts_dir: &Path,
        results_dir: &Path,
    ) -> Vec<String> {
        vec![
            "run".to_string(),
            "--rm".to_string(),
            "-i".to_string(),
            "-v".to_string(),
            format!("{}:{}:ro", scripts_dir.display(), SCRIPTS_MOUNT),
            "-v".to_string(),
            format!("{}:{}", results_dir.display(), RESULTS_MOUNT),
            "-e".to_string(),
            format!("BASE_URL={}", self.config.target_url),
            self.config.image.clone(),
            "run".to_string(),
            "--vus".to_string(),
            phase.vus.to_string(),
            "--duration".to_string(),
            format!("{}s", phase.duration_secs),
            "--summary-export".to_string(),
            format!("{}/{}", RESULTS_MOUNT, Self::output_file_name(index, phase)),
            format!("{}/{}", SCRIPTS_MOUNT, phase.script),
        ]
    }

    /// Run every phase of `scenario` in order.
    ///
    /// Returns the summary on success. On the first failing phase the
    /// summary is still written (status `failed`) before the error is
    /// returned.
    pub async fn run(&self, scenario: Scenario) -> LoadResult<RunSummary> {
        let phases = scenario.phases(&self.config);
        let total = phases.len();

        if !self.config.scripts_dir.is_dir() {
            return Err(LoadError::ScriptsDirMissing(self.config.scripts_dir.clone()));
        }
        let scripts_dir = std::fs::canonicalize(&self.config.scripts_dir)?;

        let results_dir = self.config.results_dir(scenario.name());
        std::fs::create_dir_all(&results_dir)?;
        let results_dir = std::fs::canonicalize(&results_dir)?;

        let log = RunLogWriter::create(&results_dir)?;
        let mut summary = RunSummary::new(&self.config, scenario.name());

        tracing::info!(
            scenario = %scenario,
            environment = %self.config.environment,
            target = %self.config.target_url,
            max_vus = self.config.max_vus,
            results = %results_dir.display(),
            "Starting run"
        );
        log.line(&format!(
            "run start: environment={} scenario={} target={} max_vus={}",
            self.config.environment, scenario, self.config.target_url, self.config.max_vus
        ))?;

        for (index, phase) in phases.iter().enumerate() {
            let record = self
                .run_phase(index, total, phase, &scripts_dir, &results_dir, &log)
                .await?;

            let failed = record.status == Outcome::Failed;
            let exit_code = record.exit_code;
            summary.record(record);

            if failed {
                log.line(&format!(
                    "run aborted: phase '{}' exited with {}",
                    phase.name, exit_code
                ))?;
                summary.finish(Outcome::Failed);
                summary.write(&results_dir)?;
                return Err(LoadError::PhaseFailed {
                    phase: phase.name.clone(),
                    code: exit_code,
                });
            }

            if phase.pause_after_secs > 0 {
                tracing::info!(secs = phase.pause_after_secs, "Pausing before next phase");
                log.line(&format!("pause: {}s", phase.pause_after_secs))?;
                tokio::time::sleep(Duration::from_secs(phase.pause_after_secs)).await;
            }
        }

        log.line("run complete")?;
        summary.finish(Outcome::Passed);
        summary.write(&results_dir)?;

        tracing::info!(
            phases = total,
            summary = %results_dir.join(crate::report::SUMMARY_FILE).display(),
            "Run complete"
        );

        Ok(summary)
    }

    /// Execute a single phase to completion and record its outcome.
    async fn run_phase(
        &self,
        index: usize,
        total: usize,
        phase: &Phase,
        scripts_dir: &Path,
        results_dir: &Path,
        log: &RunLogWriter,
    ) -> LoadResult<PhaseRecord> {
        tracing::info!(
            phase = %phase.name,
            script = %phase.script,
            vus = phase.vus,
            duration_secs = phase.duration_secs,
            "Phase {}/{} starting",
            index + 1,
            total
        );
        log.section(&format!("phase {}/{}: {}", index + 1, total, phase.name))?;

        let script_path = scripts_dir.join(&phase.script);
        if !script_path.is_file() {
            return Err(LoadError::ScriptMissing(script_path));
        }

        let args = self.command_args(index, phase, scripts_dir, results_dir);
        log.line(&format!("exec: {} {}", self.config.docker_bin, args.join(" ")))?;

        let output = Command::new(&self.config.docker_bin)
            .args(&args)
            .output()
            .await
            .map_err(|e| {
                LoadError::DockerUnavailable(format!("{}: {}", self.config.docker_bin, e))
            })?;

        log.raw(&output.stdout)?;
        log.raw(&output.stderr)?;

        let exit_code = output.status.code().unwrap_or(-1);
        if output.status.success() {
            tracing::info!(phase = %phase.name, "Phase completed");
        } else {
            tracing::error!(phase = %phase.name, exit_code, "Phase failed");
        }

        Ok(PhaseRecord::new(
            phase,
            exit_code,
            Self::output_file_name(index, phase),
        ))
    }

    /// Path of the summary file for a run of `scenario`, for callers that
    /// want to point the user at it.
    pub fn summary_path(&self, scenario: Scenario) -> PathBuf {
        self.config
            .results_dir(scenario.name())
            .join(crate::report::SUMMARY_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn stub_config(dir: &TempDir, stub: &str) -> RunConfig {
        let scripts = dir.path().join("k6");
        std::fs::create_dir_all(&scripts).unwrap();
        for script in ["smoke.js", "api-read.js", "api-write.js", "mixed.js"] {
            std::fs::write(scripts.join(script), "// stub").unwrap();
        }
        RunConfig {
            environment: "staging".to_string(),
            target_url: "https://staging.example.com".to_string(),
            max_vus: 500,
            duration_override: None,
            timestamp: "20260807-120000".to_string(),
            results_root: dir.path().join("results"),
            image: "grafana/k6:0.49.0".to_string(),
            scripts_dir: scripts,
            pause_secs: 0,
            docker_bin: stub.to_string(),
        }
    }

    fn write_stub(dir: &TempDir, body: &str) -> String {
        let path = dir.path().join("stub-docker.sh");
        std::fs::write(&path, body).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_command_args_shape() {
        let dir = TempDir::new().unwrap();
        let config = stub_config(&dir, "docker");
        let runner = K6Runner::new(config);

        let phase = Phase {
            name: "smoke".to_string(),
            script: "smoke.js".to_string(),
            vus: 5,
            duration_secs: 30,
            pause_after_secs: 0,
        };
        let args = runner.command_args(0, &phase, Path::new("/abs/k6"), Path::new("/abs/out"));

        assert_eq!(args[0], "run");
        assert!(args.contains(&"--rm".to_string()));
        assert!(args.contains(&"/abs/k6:/scripts:ro".to_string()));
        assert!(args.contains(&"/abs/out:/results".to_string()));
        assert!(args.contains(&"BASE_URL=https://staging.example.com".to_string()));
        assert!(args.contains(&"grafana/k6:0.49.0".to_string()));
        assert!(args.contains(&"--vus".to_string()));
        assert!(args.contains(&"5".to_string()));
        assert!(args.contains(&"30s".to_string()));
        assert!(args.contains(&"/results/01-smoke.json".to_string()));
        assert_eq!(args.last().unwrap(), "/scripts/smoke.js");
    }

    #[test]
    fn test_output_file_name_is_ordered() {
        let phase = Phase {
            name: "ramp-mid".to_string(),
            script: "mixed.js".to_string(),
            vus: 200,
            duration_secs: 300,
            pause_after_secs: 10,
        };
        assert_eq!(K6Runner::output_file_name(1, &phase), "02-ramp-mid.json");
    }

    #[tokio::test]
    async fn test_run_writes_log_and_summary() {
        let dir = TempDir::new().unwrap();
        let stub = write_stub(&dir, "#!/bin/sh\necho \"stub k6 output\"\nexit 0\n");
        let config = stub_config(&dir, &stub);
        let results_dir = config.results_dir("smoke");
        let runner = K6Runner::new(config);

        let summary = runner.run(Scenario::Smoke).await.unwrap();
        assert_eq!(summary.status, Outcome::Passed);
        assert_eq!(summary.phases.len(), 1);
        assert_eq!(summary.phases[0].output_file, "01-smoke.json");

        let log = std::fs::read_to_string(results_dir.join("run.log")).unwrap();
        assert!(log.contains("stub k6 output"));
        assert!(log.contains("run complete"));
        assert!(results_dir.join("summary.json").is_file());
    }

    #[tokio::test]
    async fn test_first_failure_aborts_sequence() {
        let dir = TempDir::new().unwrap();
        // Fails every invocation
        let stub = write_stub(&dir, "#!/bin/sh\necho \"boom\" >&2\nexit 7\n");
        let config = stub_config(&dir, &stub);
        let results_dir = config.results_dir("baseline");
        let runner = K6Runner::new(config);

        let err = runner.run(Scenario::Baseline).await.unwrap_err();
        match err {
            LoadError::PhaseFailed { phase, code } => {
                assert_eq!(phase, "api-read");
                assert_eq!(code, 7);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Summary records only the failed first phase
        let json = std::fs::read_to_string(results_dir.join("summary.json")).unwrap();
        let summary: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary.status, Outcome::Failed);
        assert_eq!(summary.phases.len(), 1);
        assert_eq!(summary.phases[0].exit_code, 7);
    }

    #[tokio::test]
    async fn test_missing_scripts_dir_errors_before_spawning() {
        let dir = TempDir::new().unwrap();
        let mut config = stub_config(&dir, "/nonexistent/docker");
        config.scripts_dir = dir.path().join("no-such-dir");
        let runner = K6Runner::new(config);

        let err = runner.run(Scenario::Smoke).await.unwrap_err();
        assert!(matches!(err, LoadError::ScriptsDirMissing(_)));
    }

    #[tokio::test]
    async fn test_missing_script_file_errors_before_spawning() {
        let dir = TempDir::new().unwrap();
        let config = stub_config(&dir, "/nonexistent/docker");
        std::fs::remove_file(config.scripts_dir.join("smoke.js")).unwrap();
        let runner = K6Runner::new(config);

        let err = runner.run(Scenario::Smoke).await.unwrap_err();
        match err {
            LoadError::ScriptMissing(path) => {
                assert!(path.ends_with("smoke.js"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unspawnable_runner_surfaces_docker_unavailable() {
        let dir = TempDir::new().unwrap();
        let config = stub_config(&dir, "/nonexistent/docker");
        let runner = K6Runner::new(config);

        let err = runner.run(Scenario::Smoke).await.unwrap_err();
        assert!(matches!(err, LoadError::DockerUnavailable(_)));
    }
}
