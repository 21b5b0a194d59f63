//! Core type definitions for the simulation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg};

/// Unique identifier for a critter, assigned from a world-scoped sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CritterId(pub u64);

impl fmt::Display for CritterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic source of critter ids
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> CritterId {
        let id = CritterId(self.next);
        self.next += 1;
        id
    }
}

/// 2D vector used for both positions and headings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Vec2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Clamp each axis independently into `[min, max]`
    pub fn clamp_axes(&self, min: Vec2, max: Vec2) -> Self {
        Self {
            x: self.x.max(min.x).min(max.x),
            y: self.y.max(min.y).min(max.y),
        }
    }

    /// Clamp both axes into `[-limit, +limit]`
    pub fn clamp_magnitude_per_axis(&self, limit: f64) -> Self {
        self.clamp_axes(Vec2::new(-limit, -limit), Vec2::new(limit, limit))
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// RGB display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);

    /// Three channels sampled uniformly in `[64, 255]`
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Rgb(rng.gen_range(64..=255), rng.gen_range(64..=255), rng.gen_range(64..=255))
    }

    /// Green-biased color used for plants
    pub fn random_green<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Rgb(rng.gen_range(0..=64), 255, rng.gen_range(0..=64))
    }
}

/// Top-level biological category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kingdom {
    Plant,
    Animal,
}

impl Kingdom {
    /// Numeric code of the variant
    pub fn value(&self) -> f64 {
        match self {
            Kingdom::Plant => 0.0,
            Kingdom::Animal => 1.0,
        }
    }

    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Kingdom::Plant
        } else {
            Kingdom::Animal
        }
    }
}

/// What a critter eats and how it gains energy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Diet {
    Carnivore,
    Herbivore,
    Omnivore,
    Solar,
}

impl Diet {
    /// Uniform pick among the animal diets (never `Solar`)
    pub fn sample_animal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.gen_range(0..3) {
            0 => Diet::Carnivore,
            1 => Diet::Herbivore,
            _ => Diet::Omnivore,
        }
    }

    pub fn eats_plants(&self) -> bool {
        matches!(self, Diet::Herbivore | Diet::Omnivore)
    }

    pub fn eats_animals(&self) -> bool {
        matches!(self, Diet::Omnivore | Diet::Carnivore)
    }
}

/// Refines eating eligibility among animals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedingStyle {
    Predator,
    Scavenger,
    /// Only used for herbivores
    Grazer,
}

impl FeedingStyle {
    pub fn value(&self) -> f64 {
        match self {
            FeedingStyle::Predator => 0.0,
            FeedingStyle::Scavenger => 1.0,
            FeedingStyle::Grazer => 2.0,
        }
    }

    /// Uniform pick between `Predator` and `Scavenger`
    pub fn sample_hunter<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            FeedingStyle::Predator
        } else {
            FeedingStyle::Scavenger
        }
    }
}
