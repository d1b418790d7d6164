//! Runtime settings for building and driving a simulation.
//!
//! Front-ends fill [`SimulationSettings`] from their own flags; embedders
//! without a CLI can start from [`SimulationSettings::from_env`], which reads
//! the `CROWD_SIM_*` variables.

use crate::control::ControlMode;
use crate::error::{Result, SimError};
use crate::pedestrian::{PedestrianParams, RespawnPolicy};
use crate::penalty::PenaltyConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_SCENARIO_ID: &str = "airport";
pub const DEFAULT_SCENARIO_DIR: &str = "scenario_configs";
pub const DEFAULT_PEDESTRIAN_COUNT: usize = 12;

pub const ENV_SCENARIO: &str = "CROWD_SIM_SCENARIO";
pub const ENV_PEDESTRIANS: &str = "CROWD_SIM_PEDESTRIANS";
pub const ENV_RANDOM_SEED: &str = "CROWD_SIM_RANDOM_SEED";
pub const ENV_RANDOM_WORLD: &str = "CROWD_SIM_RANDOM_WORLD";
pub const ENV_SCENARIO_DIR: &str = "CROWD_SIM_SCENARIO_DIR";
pub const ENV_MODE: &str = "CROWD_SIM_MODE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub scenario_id: String,
    pub pedestrian_count: usize,
    /// Deterministic seed; `None` falls back to [`DEFAULT_SEED`].
    pub seed: Option<u64>,
    /// Draw the seed from OS entropy instead, ignoring `seed`.
    pub random_seed: bool,
    pub randomize_world: bool,
    pub mode: ControlMode,
    pub respawn: RespawnPolicy,
    pub scenario_dir: PathBuf,
    pub pedestrian: PedestrianParams,
    pub penalty: PenaltyConfig,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            scenario_id: DEFAULT_SCENARIO_ID.to_string(),
            pedestrian_count: DEFAULT_PEDESTRIAN_COUNT,
            seed: None,
            random_seed: false,
            randomize_world: false,
            mode: ControlMode::default(),
            respawn: RespawnPolicy::default(),
            scenario_dir: PathBuf::from(DEFAULT_SCENARIO_DIR),
            pedestrian: PedestrianParams::default(),
            penalty: PenaltyConfig::default(),
        }
    }
}

impl SimulationSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `CROWD_SIM_*` keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = SimulationSettings::default();

        if let Some(id) = lookup(ENV_SCENARIO) {
            settings.scenario_id = id;
        }
        if let Some(raw) = lookup(ENV_PEDESTRIANS) {
            settings.pedestrian_count = raw.trim().parse().map_err(|_| SimError::InvalidSetting {
                key: ENV_PEDESTRIANS.to_string(),
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup(ENV_RANDOM_SEED) {
            settings.random_seed = raw.trim() == "1";
        }
        if let Some(raw) = lookup(ENV_RANDOM_WORLD) {
            settings.randomize_world = raw.trim() == "1";
        }
        if let Some(dir) = lookup(ENV_SCENARIO_DIR) {
            settings.scenario_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_MODE) {
            settings.mode = raw.parse()?;
        }

        Ok(settings)
    }

    /// The seed this run will use; drawn from entropy when `random_seed` is set.
    pub fn resolve_seed(&self) -> u64 {
        if self.random_seed {
            rand::random::<u64>()
        } else {
            self.seed.unwrap_or(DEFAULT_SEED)
        }
    }
}
