//! Pre-run environment checks.
//!
//! Catches the common misconfigurations (no container runtime, missing
//! scripts, unwritable results root) before the first phase starts burning
//! time. A failed check aborts the run; warnings do not.

use std::collections::BTreeSet;

use tokio::process::Command;

use crate::config::RunConfig;
use crate::scenario::Scenario;

/// Status of a single pre-flight check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed
    Pass,
    /// Suspicious but not fatal
    Warn,
    /// Run must not start
    Fail,
}

/// Result of a single pre-flight check.
#[derive(Debug)]
pub struct CheckResult {
    /// Short check name
    pub name: String,
    /// Outcome
    pub status: CheckStatus,
    /// Human-readable detail
    pub detail: String,
}

impl CheckResult {
    fn pass(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            detail: detail.into(),
        }
    }

    fn warn(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warn,
            detail: detail.into(),
        }
    }

    fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Fail,
            detail: detail.into(),
        }
    }
}

/// Run all pre-flight checks for the selected scenario.
pub async fn run_preflight(config: &RunConfig, scenario: Scenario) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    checks.push(check_docker(config).await);
    checks.push(check_scripts(config, scenario));
    checks.push(check_results_root(config));
    checks.push(check_run_dir_collision(config, scenario));

    checks
}

/// True when no check failed (warnings are OK).
pub fn all_passed(checks: &[CheckResult]) -> bool {
    !checks.iter().any(|c| c.status == CheckStatus::Fail)
}

async fn check_docker(config: &RunConfig) -> CheckResult {
    match Command::new(&config.docker_bin).arg("--version").output().await {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            CheckResult::pass("container runtime", version)
        }
        Ok(output) => CheckResult::fail(
            "container runtime",
            format!(
                "{} --version exited with {}",
                config.docker_bin,
                output.status.code().unwrap_or(-1)
            ),
        ),
        Err(e) => CheckResult::fail(
            "container runtime",
            format!("cannot invoke {}: {}", config.docker_bin, e),
        ),
    }
}

fn check_scripts(config: &RunConfig, scenario: Scenario) -> CheckResult {
    if !config.scripts_dir.is_dir() {
        return CheckResult::fail(
            "test scripts",
            format!("scripts directory not found: {}", config.scripts_dir.display()),
        );
    }

    let scripts: BTreeSet<String> = scenario
        .phases(config)
        .into_iter()
        .map(|p| p.script)
        .collect();

    let missing: Vec<String> = scripts
        .iter()
        .filter(|s| !config.scripts_dir.join(s.as_str()).is_file())
        .cloned()
        .collect();

    if missing.is_empty() {
        CheckResult::pass(
            "test scripts",
            format!("{} script(s) present in {}", scripts.len(), config.scripts_dir.display()),
        )
    } else {
        CheckResult::fail("test scripts", format!("missing: {}", missing.join(", ")))
    }
}

fn check_results_root(config: &RunConfig) -> CheckResult {
    match std::fs::create_dir_all(&config.results_root) {
        Ok(()) => CheckResult::pass(
            "results root",
            format!("writable: {}", config.results_root.display()),
        ),
        Err(e) => CheckResult::fail(
            "results root",
            format!("cannot create {}: {}", config.results_root.display(), e),
        ),
    }
}

fn check_run_dir_collision(config: &RunConfig, scenario: Scenario) -> CheckResult {
    let dir = config.results_dir(scenario.name());
    if dir.exists() {
        CheckResult::warn(
            "results directory",
            format!("{} already exists, output will be appended", dir.display()),
        )
    } else {
        CheckResult::pass("results directory", dir.display().to_string())
    }
}
