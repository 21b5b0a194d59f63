//! Configuration types for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Arena dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Width of the arena
    pub width: f64,
    /// Height of the arena
    pub height: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Population sizing and pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Soft cap checked when a birth is attempted
    pub limit: usize,
    /// Number of randomized critters seeded at startup
    pub initial_count: usize,
    /// Target steps per second (0 disables pacing)
    pub tick_rate: u32,
    /// Steps between population metric snapshots
    pub metrics_interval: u64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            limit: 50,
            initial_count: 15,
            tick_rate: 30,
            metrics_interval: 100,
        }
    }
}

/// Per-critter constants that are not part of the heritable trait set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CritterConfig {
    /// Steps a dead critter lingers before removal
    pub decay_ticks: i64,
    /// Energy a solar critter gains per step
    pub solar_gain: f64,
    /// Length of generated display names
    pub name_length: usize,
    /// Half-width of the random heading perturbation per axis
    pub wander_jitter: f64,
}

impl Default for CritterConfig {
    fn default() -> Self {
        Self {
            decay_ticks: 20,
            solar_gain: 2.0,
            name_length: 8,
            wander_jitter: 1.0,
        }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Stop after this many steps (`None` runs until quit)
    pub max_steps: Option<u64>,
    pub arena: ArenaConfig,
    pub population: PopulationConfig,
    pub critter: CritterConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_steps: None,
            arena: ArenaConfig::default(),
            population: PopulationConfig::default(),
            critter: CritterConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Read a JSON config file; absent fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading simulation config");
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let ArenaConfig { width, height } = self.arena;
        if !(width.is_finite() && width > 0.0) || !(height.is_finite() && height > 0.0) {
            return Err(Error::Validation(format!(
                "arena must have positive finite dimensions, got {}x{}",
                width, height
            )));
        }

        if self.critter.decay_ticks < 0 {
            return Err(Error::Validation(format!(
                "decay_ticks must not be negative, got {}",
                self.critter.decay_ticks
            )));
        }

        if !self.critter.solar_gain.is_finite() {
            return Err(Error::Validation("solar_gain must be finite".to_string()));
        }

        if !(self.critter.wander_jitter.is_finite() && self.critter.wander_jitter >= 0.0) {
            return Err(Error::Validation(format!(
                "wander_jitter must be finite and non-negative, got {}",
                self.critter.wander_jitter
            )));
        }

        if self.critter.name_length == 0 {
            return Err(Error::Validation("name_length must be at least 1".to_string()));
        }

        if self.population.metrics_interval == 0 {
            return Err(Error::Validation(
                "metrics_interval must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
