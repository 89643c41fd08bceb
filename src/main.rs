//! loadrun - containerized k6 load-test orchestrator
//!
//! Runs named load-test scenarios against a target environment by invoking
//! a Docker-packaged k6 once per phase, writing results and a summary under
//! a per-run directory.
//!
//! Usage:
//!   loadrun smoke
//!   loadrun load --environment production --max-vus 200
//!   loadrun full --duration 60
//!   loadrun --list
//!
//! Every input has an environment variable fallback (SCENARIO, TARGET_ENV,
//! MAX_VUS, DURATION, RUN_TIMESTAMP, ...), so CI pipelines can configure a
//! run without touching the argument list.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use loadrun_core::preflight::{self, CheckStatus};
use loadrun_core::{config, K6Runner, RunConfig, Scenario};

/// Containerized k6 load-test orchestrator
#[derive(Parser, Debug)]
#[command(name = "loadrun")]
#[command(version = "0.1.0")]
#[command(about = "Run containerized k6 load-test scenarios against a target environment")]
struct Args {
    /// Scenario to run: smoke, baseline, load, stress or full
    #[arg(required_unless_present = "list", env = "SCENARIO")]
    scenario: Option<String>,

    /// Target environment name (local, staging, production)
    #[arg(short, long, default_value = config::DEFAULT_ENVIRONMENT, env = "TARGET_ENV")]
    environment: String,

    /// Explicit target base URL, overriding the environment mapping
    #[arg(long, env = "TARGET_URL")]
    target_url: Option<String>,

    /// Concurrency ceiling: maximum simulated virtual users
    #[arg(short, long, default_value_t = config::DEFAULT_MAX_VUS, env = "MAX_VUS")]
    max_vus: u32,

    /// Override every phase duration, in seconds
    #[arg(short, long, env = "DURATION")]
    duration: Option<u64>,

    /// Run timestamp used in the results directory name (default: now)
    #[arg(long, env = "RUN_TIMESTAMP")]
    timestamp: Option<String>,

    /// Root directory for run results
    #[arg(short, long, default_value = config::DEFAULT_RESULTS_ROOT, env = "RESULTS_DIR")]
    results_dir: PathBuf,

    /// Runner container image
    #[arg(long, default_value = config::DEFAULT_IMAGE, env = "K6_IMAGE")]
    image: String,

    /// Directory containing the k6 test scripts
    #[arg(long, default_value = config::DEFAULT_SCRIPTS_DIR, env = "K6_SCRIPTS_DIR")]
    scripts_dir: PathBuf,

    /// Seconds to pause between phases
    #[arg(long, default_value_t = config::DEFAULT_PAUSE_SECS, env = "PHASE_PAUSE")]
    pause: u64,

    /// Container runtime binary
    #[arg(long, default_value = config::DEFAULT_DOCKER_BIN, env = "LOADRUN_DOCKER_BIN", hide = true)]
    docker_bin: String,

    /// List available scenarios and exit
    #[arg(long)]
    list: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if args.list {
        println!("Available scenarios:");
        for scenario in Scenario::ALL {
            println!("  {:<10} {}", scenario.name(), scenario.description());
        }
        return Ok(());
    }

    // required_unless_present guarantees the name is set past this point
    let name = args.scenario.as_deref().unwrap_or_default();
    let scenario = Scenario::from_str(name)?;

    let target_url = RunConfig::resolve_target_url(&args.environment, args.target_url.as_deref())?;
    let config = RunConfig {
        environment: args.environment,
        target_url,
        max_vus: args.max_vus,
        duration_override: args.duration,
        timestamp: args.timestamp.unwrap_or_else(RunConfig::default_timestamp),
        results_root: args.results_dir,
        image: args.image,
        scripts_dir: args.scripts_dir,
        pause_secs: args.pause,
        docker_bin: args.docker_bin,
    };
    config.validate()?;

    let checks = preflight::run_preflight(&config, scenario).await;
    for check in &checks {
        match check.status {
            CheckStatus::Pass => tracing::debug!("{}: {}", check.name, check.detail),
            CheckStatus::Warn => tracing::warn!("{}: {}", check.name, check.detail),
            CheckStatus::Fail => tracing::error!("{}: {}", check.name, check.detail),
        }
    }
    if !preflight::all_passed(&checks) {
        anyhow::bail!("preflight checks failed, not starting the run");
    }

    let runner = K6Runner::new(config);
    let summary = runner
        .run(scenario)
        .await
        .context("Load-test run failed")?;

    println!(
        "Run complete: {} phase(s), status {:?}",
        summary.phases.len(),
        summary.status
    );
    println!("Summary: {}", runner.summary_path(scenario).display());

    Ok(())
}
