//! Engine configuration from YAML.
//!
//! Every field is optional; omitted fields keep the engine defaults. Example:
//!
//! ```yaml
//! min_overlap_minutes: 300
//! captain_min_overlap_minutes: 180
//! team_capacity_min: 3
//! team_capacity_max: 4
//! overlap_policy: whole-team-intersection
//! branch_limit: 200000
//! time_budget_ms: 5000
//! workers: 4
//! ```
//!
//! `captain_min_overlap_minutes: 0` disables the captain check;
//! `branch_limit: 0` removes the branch ceiling; `workers: 0` (the default)
//! uses all cores.

use std::fs;
use std::time::Duration;

use serde::Deserialize;

use crate::parallel::WorkerPool;
use crate::search::{MatchConfig, OverlapPolicy};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub min_overlap_minutes: Option<u32>,
    #[serde(default)]
    pub captain_min_overlap_minutes: Option<u32>,
    #[serde(default)]
    pub team_capacity_min: Option<usize>,
    #[serde(default)]
    pub team_capacity_max: Option<usize>,
    #[serde(default)]
    pub overlap_policy: Option<OverlapPolicy>,
    #[serde(default)]
    pub branch_limit: Option<usize>,
    #[serde(default)]
    pub time_budget_ms: Option<u64>,
    #[serde(default)]
    pub workers: Option<usize>,
}

impl ConfigFile {
    pub fn into_settings(self) -> (MatchConfig, WorkerPool) {
        let defaults = MatchConfig::default();
        let config = MatchConfig {
            min_overlap_minutes: self
                .min_overlap_minutes
                .unwrap_or(defaults.min_overlap_minutes),
            captain_min_overlap_minutes: match self.captain_min_overlap_minutes {
                Some(0) => None,
                Some(minutes) => Some(minutes),
                None => defaults.captain_min_overlap_minutes,
            },
            team_capacity: (
                self.team_capacity_min.unwrap_or(defaults.team_capacity.0),
                self.team_capacity_max.unwrap_or(defaults.team_capacity.1),
            ),
            overlap_policy: self.overlap_policy.unwrap_or_default(),
            branch_limit: match self.branch_limit {
                Some(0) => None,
                Some(limit) => Some(limit),
                None => defaults.branch_limit,
            },
            time_budget: self.time_budget_ms.map(Duration::from_millis),
        };
        let workers = WorkerPool::with_workers(self.workers.unwrap_or(0));
        (config, workers)
    }
}

/// Load a YAML config file and resolve it against the engine defaults.
pub fn load_config(path: &str) -> Result<(MatchConfig, WorkerPool), String> {
    let raw = fs::read_to_string(path).map_err(|err| format!("unable to read '{path}': {err}"))?;
    config_from_yaml(&raw)
}

pub fn config_from_yaml(raw: &str) -> Result<(MatchConfig, WorkerPool), String> {
    let file: ConfigFile =
        serde_yaml::from_str(raw).map_err(|err| format!("unable to parse config yaml: {err}"))?;
    Ok(file.into_settings())
}
