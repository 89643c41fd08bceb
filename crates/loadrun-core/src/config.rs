//! Run configuration assembled from CLI flags and environment variables.
//!
//! All configuration is a handful of scalars; nothing is read back after the
//! run starts. The per-run results directory name is derived here so the
//! runner and the summary agree on it.

use std::path::PathBuf;

use crate::error::{LoadError, LoadResult};

/// Default target environment name
pub const DEFAULT_ENVIRONMENT: &str = "staging";
/// Default concurrency ceiling (virtual users)
pub const DEFAULT_MAX_VUS: u32 = 500;
/// Default root directory for run results
pub const DEFAULT_RESULTS_ROOT: &str = "results";
/// Default runner container image
pub const DEFAULT_IMAGE: &str = "grafana/k6:0.49.0";
/// Default directory containing the k6 test scripts
pub const DEFAULT_SCRIPTS_DIR: &str = "k6";
/// Default pause between phases, in seconds
pub const DEFAULT_PAUSE_SECS: u64 = 10;
/// Default container runtime binary
pub const DEFAULT_DOCKER_BIN: &str = "docker";

/// Configuration scalars for a single orchestrated run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Target environment name (e.g. "staging")
    pub environment: String,
    /// Resolved base URL the test scripts hit
    pub target_url: String,
    /// Concurrency ceiling: upper bound on simulated virtual users
    pub max_vus: u32,
    /// When set, replaces every phase's default duration (seconds)
    pub duration_override: Option<u64>,
    /// Run timestamp used in the results directory name
    pub timestamp: String,
    /// Root directory under which per-run directories are created
    pub results_root: PathBuf,
    /// Runner container image
    pub image: String,
    /// Directory containing the k6 test scripts
    pub scripts_dir: PathBuf,
    /// Seconds to pause between phases
    pub pause_secs: u64,
    /// Container runtime binary (overridable for tests)
    pub docker_bin: String,
}

impl RunConfig {
    /// Resolve the base URL for an environment name.
    ///
    /// An explicit URL always wins. Without one, only the built-in
    /// environments are accepted.
    pub fn resolve_target_url(environment: &str, explicit: Option<&str>) -> LoadResult<String> {
        if let Some(url) = explicit {
            return Ok(url.to_string());
        }
        match environment {
            "local" => Ok("http://host.docker.internal:3000".to_string()),
            "staging" => Ok("https://staging.example.com".to_string()),
            "production" => Ok("https://www.example.com".to_string()),
            other => Err(LoadError::UnknownEnvironment(other.to_string())),
        }
    }

    /// Timestamp for the results directory name, local time.
    pub fn default_timestamp() -> String {
        chrono::Local::now().format("%Y%m%d-%H%M%S").to_string()
    }

    /// Validate the scalar invariants.
    ///
    /// The timestamp lands in a directory name, so it must not be empty or
    /// contain path separators or parent references.
    pub fn validate(&self) -> LoadResult<()> {
        if self.max_vus == 0 {
            return Err(LoadError::InvalidCeiling(self.max_vus));
        }
        if self.timestamp.is_empty()
            || self.timestamp.contains('/')
            || self.timestamp.contains('\\')
            || self.timestamp.contains("..")
        {
            return Err(LoadError::InvalidTimestamp(self.timestamp.clone()));
        }
        Ok(())
    }

    /// Directory name for this run: `<environment>-<scenario>-<timestamp>`.
    pub fn run_dir_name(&self, scenario: &str) -> String {
        format!("{}-{}-{}", self.environment, scenario, self.timestamp)
    }

    /// Full path of the per-run results directory.
    pub fn results_dir(&self, scenario: &str) -> PathBuf {
        self.results_root.join(self.run_dir_name(scenario))
    }

    /// Phase duration in seconds: the run-level override, or the phase default.
    pub fn duration_for(&self, default_secs: u64) -> u64 {
        self.duration_override.unwrap_or(default_secs)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            target_url: "https://staging.example.com".to_string(),
            max_vus: DEFAULT_MAX_VUS,
            duration_override: None,
            timestamp: Self::default_timestamp(),
            results_root: PathBuf::from(DEFAULT_RESULTS_ROOT),
            image: DEFAULT_IMAGE.to_string(),
            scripts_dir: PathBuf::from(DEFAULT_SCRIPTS_DIR),
            pause_secs: DEFAULT_PAUSE_SECS,
            docker_bin: DEFAULT_DOCKER_BIN.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_environments_resolve() {
        assert_eq!(
            RunConfig::resolve_target_url("staging", None).unwrap(),
            "https://staging.example.com"
        );
        assert_eq!(
            RunConfig::resolve_target_url("production", None).unwrap(),
            "https://www.example.com"
        );
        assert!(RunConfig::resolve_target_url("local", None)
            .unwrap()
            .starts_with("http://"));
    }

    #[test]
    fn test_explicit_url_wins() {
        let url = RunConfig::resolve_target_url("staging", Some("http://10.0.0.5:8080")).unwrap();
        assert_eq!(url, "http://10.0.0.5:8080");
    }

    #[test]
    fn test_unknown_environment_without_override_errors() {
        let err = RunConfig::resolve_target_url("qa-17", None).unwrap_err();
        assert!(matches!(err, LoadError::UnknownEnvironment(_)));
    }

    #[test]
    fn test_unknown_environment_with_override_is_fine() {
        assert!(RunConfig::resolve_target_url("qa-17", Some("http://qa-17.internal")).is_ok());
    }

    #[test]
    fn test_results_dir_naming() {
        let config = RunConfig {
            environment: "staging".to_string(),
            timestamp: "20260807-101500".to_string(),
            results_root: PathBuf::from("results"),
            ..RunConfig::default()
        };
        assert_eq!(
            config.results_dir("smoke"),
            PathBuf::from("results/staging-smoke-20260807-101500")
        );
    }

    #[test]
    fn test_validate_rejects_path_separators_in_timestamp() {
        let config = RunConfig {
            timestamp: "../escape".to_string(),
            ..RunConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LoadError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_ceiling() {
        let config = RunConfig {
            max_vus: 0,
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(LoadError::InvalidCeiling(0))));
    }

    #[test]
    fn test_duration_override() {
        let config = RunConfig {
            duration_override: Some(45),
            ..RunConfig::default()
        };
        assert_eq!(config.duration_for(300), 45);

        let config = RunConfig::default();
        assert_eq!(config.duration_for(300), 300);
    }

    #[test]
    fn test_default_timestamp_is_directory_safe() {
        let ts = RunConfig::default_timestamp();
        let config = RunConfig {
            timestamp: ts,
            ..RunConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
