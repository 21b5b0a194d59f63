//! Heritable trait sets: randomized generation and two-parent crossover.

use lifelab_core::{Diet, FeedingStyle, Kingdom, Rgb};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Energy capacity of the default genotype; offspring start with this much energy
pub const DEFAULT_ENERGY_CAPACITY: f64 = 1000.0;

/// How a blended trait is stored, which decides whether randomization touches it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitKind {
    Numeric,
    Color,
    Categorical,
}

/// Traits inherited per field from a randomly chosen parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendedTrait {
    Speed,
    EnergyCapacity,
    DrainPerTick,
    Color,
    MutationProbability,
    Diet,
    DigestionEfficiency,
    BreedCooldown,
}

impl BlendedTrait {
    pub const ALL: [BlendedTrait; 8] = [
        BlendedTrait::Speed,
        BlendedTrait::EnergyCapacity,
        BlendedTrait::DrainPerTick,
        BlendedTrait::Color,
        BlendedTrait::MutationProbability,
        BlendedTrait::Diet,
        BlendedTrait::DigestionEfficiency,
        BlendedTrait::BreedCooldown,
    ];

    pub fn kind(self) -> TraitKind {
        match self {
            BlendedTrait::Color => TraitKind::Color,
            BlendedTrait::Diet => TraitKind::Categorical,
            _ => TraitKind::Numeric,
        }
    }
}

/// One genotype.
///
/// Kingdom and feeding style are *linked*: crossover always takes them from
/// the first parent, while their numeric shadows are drawn independently from
/// either parent and may drift away from the variant they shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitSet {
    /// Maximum heading magnitude per axis
    pub speed: f64,
    pub energy_capacity: f64,
    /// Energy lost per step by non-solar critters
    pub drain_per_tick: f64,
    pub color: Rgb,
    /// Half of the cooldown applied after breeding
    pub breed_cooldown: f64,
    pub sense_radius: f64,
    /// Carried and inherited but not consulted when generating traits
    pub mutation_probability: f64,
    pub diet: Diet,
    pub feeding_style: FeedingStyle,
    pub feeding_style_shadow: f64,
    pub kingdom: Kingdom,
    pub kingdom_shadow: f64,
    /// Energy both parties gain when this critter feeds
    pub digestion_efficiency: f64,
}

impl Default for TraitSet {
    fn default() -> Self {
        Self {
            speed: 2.0,
            energy_capacity: DEFAULT_ENERGY_CAPACITY,
            drain_per_tick: 1.0,
            color: Rgb::RED,
            breed_cooldown: 400.0,
            sense_radius: 100.0,
            mutation_probability: 0.0,
            diet: Diet::Omnivore,
            feeding_style: FeedingStyle::Grazer,
            feeding_style_shadow: FeedingStyle::Grazer.value(),
            kingdom: Kingdom::Plant,
            kingdom_shadow: Kingdom::Plant.value(),
            digestion_efficiency: 1.0,
        }
    }
}

impl TraitSet {
    /// A fresh random genotype derived from the defaults
    pub fn random(rng: &mut ChaCha8Rng) -> Self {
        let mut traits = Self::default();
        traits.randomize(rng);
        traits
    }

    fn numeric_mut(&mut self, t: BlendedTrait) -> Option<&mut f64> {
        match t {
            BlendedTrait::Speed => Some(&mut self.speed),
            BlendedTrait::EnergyCapacity => Some(&mut self.energy_capacity),
            BlendedTrait::DrainPerTick => Some(&mut self.drain_per_tick),
            BlendedTrait::MutationProbability => Some(&mut self.mutation_probability),
            BlendedTrait::DigestionEfficiency => Some(&mut self.digestion_efficiency),
            BlendedTrait::BreedCooldown => Some(&mut self.breed_cooldown),
            BlendedTrait::Color | BlendedTrait::Diet => None,
        }
    }

    /// Copy a single blended field from `parent`
    fn inherit(&mut self, t: BlendedTrait, parent: &TraitSet) {
        match t {
            BlendedTrait::Speed => self.speed = parent.speed,
            BlendedTrait::EnergyCapacity => self.energy_capacity = parent.energy_capacity,
            BlendedTrait::DrainPerTick => self.drain_per_tick = parent.drain_per_tick,
            BlendedTrait::Color => self.color = parent.color,
            BlendedTrait::MutationProbability => {
                self.mutation_probability = parent.mutation_probability
            }
            BlendedTrait::Diet => self.diet = parent.diet,
            BlendedTrait::DigestionEfficiency => {
                self.digestion_efficiency = parent.digestion_efficiency
            }
            BlendedTrait::BreedCooldown => self.breed_cooldown = parent.breed_cooldown,
        }
    }

    /// Perturb numeric traits and resample color, kingdom, diet and feeding style.
    ///
    /// Colors and categorical traits are skipped by the perturbation pass; they
    /// are resampled afterwards under the plant/herbivore constraints.
    pub fn randomize(&mut self, rng: &mut ChaCha8Rng) {
        for t in BlendedTrait::ALL {
            if t.kind() != TraitKind::Numeric {
                continue;
            }
            if let Some(value) = self.numeric_mut(t) {
                *value = perturb(*value, rng);
            }
        }

        self.color = Rgb::random(rng);

        self.kingdom = Kingdom::sample(rng);
        self.kingdom_shadow = self.kingdom.value();

        if self.kingdom == Kingdom::Plant {
            self.diet = Diet::Solar;
            self.color = Rgb::random_green(rng);
        } else {
            self.diet = Diet::sample_animal(rng);
        }

        self.feeding_style = if self.diet == Diet::Herbivore {
            FeedingStyle::Grazer
        } else {
            FeedingStyle::sample_hunter(rng)
        };
        self.feeding_style_shadow = self.feeding_style.value();
    }

    /// Combine `self` and `other` into a child genotype
    pub fn cross(&self, other: &TraitSet, rng: &mut ChaCha8Rng) -> TraitSet {
        let mut child = TraitSet::default();

        for t in BlendedTrait::ALL {
            let parent = pick(self, other, rng);
            child.inherit(t, parent);
        }

        child.kingdom = self.kingdom;
        child.kingdom_shadow = pick(self, other, rng).kingdom_shadow;

        child.feeding_style = self.feeding_style;
        child.feeding_style_shadow = pick(self, other, rng).feeding_style_shadow;

        child
    }
}

fn pick<'a>(a: &'a TraitSet, b: &'a TraitSet, rng: &mut ChaCha8Rng) -> &'a TraitSet {
    if rng.gen_bool(0.5) {
        a
    } else {
        b
    }
}

/// Uniform sample between `value / 2` and `value` nudged by up to ±0.1.
/// Either bound may be the larger one.
fn perturb(value: f64, rng: &mut ChaCha8Rng) -> f64 {
    let low = value / 2.0;
    let high = value + rng.gen_range(-0.1..=0.1);
    low + (high - low) * rng.gen::<f64>()
}
