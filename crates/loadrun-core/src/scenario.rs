//! Scenario dispatch table and phase parameters.
//!
//! A scenario is a fixed, ordered sequence of phases. Each phase is one
//! invocation of the containerized runner with a VU count bounded by the
//! configured ceiling. The table below is the whole of the dispatch logic;
//! nothing is data-driven from disk.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::error::LoadError;

/// Baseline read concurrency the scaled profiles are derived from.
const BASELINE_VUS: u32 = 50;
/// Peak concurrency of the load ramp.
const LOAD_PEAK_VUS: u32 = 400;
/// Recovery pause between sub-sequences of the full scenario, seconds.
const RECOVERY_PAUSE_SECS: u64 = 30;

/// One of the fixed named test profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Minimal sanity check: a handful of VUs for half a minute
    Smoke,
    /// Steady read/write traffic at nominal concurrency
    Baseline,
    /// Stepped ramp up to the load peak
    Load,
    /// Spike and soak above the load peak
    Stress,
    /// All of the above, in order, with recovery pauses between them
    Full,
}

impl Scenario {
    /// All scenarios, in listing order.
    pub const ALL: [Scenario; 5] = [
        Scenario::Smoke,
        Scenario::Baseline,
        Scenario::Load,
        Scenario::Stress,
        Scenario::Full,
    ];

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Smoke => "smoke",
            Scenario::Baseline => "baseline",
            Scenario::Load => "load",
            Scenario::Stress => "stress",
            Scenario::Full => "full",
        }
    }

    /// One-line description for `--list`.
    pub fn description(&self) -> &'static str {
        match self {
            Scenario::Smoke => "Quick sanity check with a handful of VUs",
            Scenario::Baseline => "Steady read/write traffic at nominal concurrency",
            Scenario::Load => "Stepped ramp up to peak load",
            Scenario::Stress => "Spike and soak beyond peak load",
            Scenario::Full => "Smoke, baseline, load and stress in sequence",
        }
    }

    /// The phase sequence for this scenario, with the ceiling and duration
    /// override from `config` already applied.
    pub fn phases(&self, config: &RunConfig) -> Vec<Phase> {
        let mut phases = match self {
            Scenario::Smoke => smoke_phases(config),
            Scenario::Baseline => baseline_phases(config),
            Scenario::Load => load_phases(config),
            Scenario::Stress => stress_phases(config),
            Scenario::Full => {
                let mut all = Vec::new();
                for sub in [Scenario::Smoke, Scenario::Baseline, Scenario::Load, Scenario::Stress]
                {
                    let mut sub_phases = sub.phases(config);
                    // Longer recovery pause between sub-sequences
                    if sub != Scenario::Stress {
                        if let Some(last) = sub_phases.last_mut() {
                            last.pause_after_secs = RECOVERY_PAUSE_SECS;
                        }
                    }
                    all.extend(sub_phases);
                }
                all
            }
        };
        if let Some(last) = phases.last_mut() {
            last.pause_after_secs = 0;
        }
        phases
    }
}

impl FromStr for Scenario {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smoke" => Ok(Scenario::Smoke),
            "baseline" => Ok(Scenario::Baseline),
            "load" => Ok(Scenario::Load),
            "stress" => Ok(Scenario::Stress),
            "full" => Ok(Scenario::Full),
            other => Err(LoadError::UnknownScenario(other.to_string())),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single invocation of the containerized runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    /// Phase name, used in output file naming and logs
    pub name: String,
    /// k6 script filename inside the scripts directory
    pub script: String,
    /// Effective VU count (already bounded by the ceiling)
    pub vus: u32,
    /// Phase duration in seconds
    pub duration_secs: u64,
    /// Pause before the next phase, seconds (0 after the last phase)
    pub pause_after_secs: u64,
}

/// Cap a requested VU count at the configured ceiling, floor of 1.
pub fn bounded_vus(base: u32, ceiling: u32) -> u32 {
    base.min(ceiling).max(1)
}

/// Scale a base VU count by a factor, then cap at the ceiling.
pub fn scaled_vus(base: u32, factor: f64, ceiling: u32) -> u32 {
    let scaled = (f64::from(base) * factor).round() as u32;
    bounded_vus(scaled, ceiling)
}

fn phase(config: &RunConfig, name: &str, script: &str, vus: u32, duration_secs: u64) -> Phase {
    Phase {
        name: name.to_string(),
        script: script.to_string(),
        vus: bounded_vus(vus, config.max_vus),
        duration_secs: config.duration_for(duration_secs),
        pause_after_secs: config.pause_secs,
    }
}

fn smoke_phases(config: &RunConfig) -> Vec<Phase> {
    vec![phase(config, "smoke", "smoke.js", 5, 30)]
}

fn baseline_phases(config: &RunConfig) -> Vec<Phase> {
    vec![
        phase(config, "api-read", "api-read.js", BASELINE_VUS, 120),
        phase(config, "api-write", "api-write.js", BASELINE_VUS / 2, 120),
    ]
}

fn load_phases(config: &RunConfig) -> Vec<Phase> {
    vec![
        phase(config, "ramp-low", "mixed.js", LOAD_PEAK_VUS / 4, 300),
        phase(config, "ramp-mid", "mixed.js", LOAD_PEAK_VUS / 2, 300),
        phase(config, "ramp-peak", "mixed.js", LOAD_PEAK_VUS, 300),
    ]
}

fn stress_phases(config: &RunConfig) -> Vec<Phase> {
    vec![
        phase(
            config,
            "spike",
            "mixed.js",
            scaled_vus(LOAD_PEAK_VUS, 2.0, config.max_vus),
            180,
        ),
        phase(
            config,
            "soak",
            "mixed.js",
            scaled_vus(LOAD_PEAK_VUS, 1.5, config.max_vus),
            600,
        ),
    ]
}
