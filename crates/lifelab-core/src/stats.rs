//! Population statistics.

use crate::types::{Diet, Kingdom};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of the population at one instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    /// Step the snapshot was taken after
    pub tick: u64,
    pub total: usize,
    pub living: usize,
    pub dead: usize,
    pub plants: usize,
    pub animals: usize,
    /// Living critters per diet
    pub diets: BTreeMap<String, usize>,
    /// Mean energy over living critters
    pub avg_energy: f64,
    pub max_energy: f64,
}

impl PopulationStats {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    /// Fold one critter into the snapshot
    pub fn record(&mut self, kingdom: Kingdom, diet: Diet, energy: f64, alive: bool) {
        self.total += 1;
        match kingdom {
            Kingdom::Plant => self.plants += 1,
            Kingdom::Animal => self.animals += 1,
        }

        if !alive {
            self.dead += 1;
            return;
        }

        // Incremental mean
        let n = self.living as f64;
        self.avg_energy = (self.avg_energy * n + energy) / (n + 1.0);
        self.max_energy = if self.living == 0 {
            energy
        } else {
            self.max_energy.max(energy)
        };
        self.living += 1;
        *self.diets.entry(format!("{:?}", diet)).or_insert(0) += 1;
    }
}

/// Cumulative lifecycle counters kept by the world
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleCounters {
    pub births: u64,
    pub deaths: u64,
    pub removals: u64,
}

/// Summary emitted at the end of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub steps: u64,
    pub quit_requested: bool,
    pub lifecycle: LifecycleCounters,
    pub final_population: PopulationStats,
}
