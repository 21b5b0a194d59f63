//! Critter state and the per-step behavior state machine.

use crate::frontend::{NameSupplier, Shape, Sprite};
use crate::phenotype::{TraitSet, DEFAULT_ENERGY_CAPACITY};
use crate::simulation::PopulationView;
use lifelab_core::{
    ArenaConfig, CritterConfig, CritterId, Diet, FeedingStyle, IdSequence, Kingdom, Rgb, Vec2,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Display label every plant reports instead of its own name
pub const PLANT_LABEL: &str = "A Plant";

/// Shared state a critter needs while it takes its step
pub struct StepContext<'a> {
    pub config: &'a CritterConfig,
    pub arena: &'a ArenaConfig,
    /// Soft population cap for births
    pub limit: usize,
    /// Births already queued this sweep; they count toward `limit`
    pub pending_births: usize,
    pub rng: &'a mut ChaCha8Rng,
    pub ids: &'a mut IdSequence,
    pub names: &'a mut dyn NameSupplier,
}

impl StepContext<'_> {
    /// A fresh critter with the next id and a generated name
    pub fn make_critter(&mut self, traits: TraitSet) -> Critter {
        let id = self.ids.next_id();
        let name = self.names.make_name(self.config.name_length, self.rng);
        Critter::new(id, name, traits, self.config)
    }
}

/// Result of one call to [`Critter::tick`]
#[derive(Debug)]
pub enum TickOutcome {
    /// Alive for the whole step, possibly with a newborn to add
    Active { birth: Option<Critter> },
    /// Dead; `just_died` on the step energy first dropped below zero,
    /// `expired` once the decay countdown is exhausted
    Dead { just_died: bool, expired: bool },
}

/// A living (or decaying) organism
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Critter {
    pub id: CritterId,
    pub position: Vec2,
    pub heading: Vec2,
    /// Current energy; negative means dead
    pub energy: f64,
    /// Steps left before a dead critter is removed
    pub decay: i64,
    pub breed_cooldown: f64,
    pub traits: TraitSet,
    name: String,
    expired: bool,
}

impl Critter {
    /// Full energy for the trait set, zero cooldown, at the origin
    pub fn new(id: CritterId, name: String, traits: TraitSet, config: &CritterConfig) -> Self {
        Self {
            id,
            position: Vec2::ZERO,
            heading: Vec2::ZERO,
            energy: traits.energy_capacity,
            decay: config.decay_ticks,
            breed_cooldown: 0.0,
            traits,
            name,
            expired: false,
        }
    }

    pub fn name(&self) -> &str {
        if self.traits.kingdom == Kingdom::Plant {
            PLANT_LABEL
        } else {
            &self.name
        }
    }

    pub fn is_dead(&self) -> bool {
        self.energy < 0.0
    }

    /// Dead with the decay countdown exhausted, awaiting removal
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn is_plant(&self) -> bool {
        self.traits.kingdom == Kingdom::Plant
    }

    /// Size derived from current energy
    pub fn radius(&self) -> i64 {
        (self.energy / 100.0).floor() as i64
    }

    pub fn place_randomly(&mut self, arena: &ArenaConfig, rng: &mut ChaCha8Rng) {
        self.position = Vec2::new(arena.width * rng.gen::<f64>(), arena.height * rng.gen::<f64>());
    }

    /// Put the critter at `(x, y)`, keeping its body inside the arena
    pub fn move_to(&mut self, x: f64, y: f64, arena: &ArenaConfig) {
        let r = self.radius().max(0) as f64;
        let max_x = (arena.width - r).max(0.0);
        let max_y = (arena.height - r).max(0.0);

        let x = if x < 0.0 { r.min(max_x) } else { x.min(max_x) };
        let y = if y < 0.0 { r.min(max_y) } else { y.min(max_y) };

        self.position = Vec2::new(x, y);
    }

    pub fn sprite(&self) -> Sprite {
        let alive = !self.is_dead();
        Sprite {
            shape: if self.is_plant() {
                Shape::Square
            } else {
                Shape::Circle
            },
            color: if alive { self.traits.color } else { Rgb::BLACK },
            position: self.position,
            radius: self.radius(),
            alive,
        }
    }

    /// Advance one step: metabolize, check expiry, cool down, move, interact.
    pub fn tick(&mut self, others: &mut PopulationView<'_>, ctx: &mut StepContext<'_>) -> TickOutcome {
        let was_alive = !self.is_dead();
        self.metabolize(ctx.config);

        if self.is_dead() {
            self.decay -= 1;
            if self.decay <= 0 {
                self.expired = true;
            }
            return TickOutcome::Dead {
                just_died: was_alive,
                expired: self.expired,
            };
        }

        // Stops once it is no longer positive, which may be exactly zero
        if self.breed_cooldown > 0.0 {
            self.breed_cooldown -= 1.0;
        }

        if !self.is_plant() {
            self.wander(ctx.config.wander_jitter, ctx.arena, ctx.rng);
        }

        let birth = self.interact(others, ctx);
        TickOutcome::Active { birth }
    }

    fn metabolize(&mut self, config: &CritterConfig) {
        if self.traits.diet == Diet::Solar {
            self.energy = (self.energy + config.solar_gain).min(self.traits.energy_capacity);
        } else {
            self.energy -= self.traits.drain_per_tick;
        }
    }

    fn wander(&mut self, jitter: f64, arena: &ArenaConfig, rng: &mut ChaCha8Rng) {
        self.heading += Vec2::new(rng.gen_range(-jitter..=jitter), rng.gen_range(-jitter..=jitter));
        self.heading = self.heading.clamp_magnitude_per_axis(self.traits.speed);

        self.position += self.heading;
        self.position = self
            .position
            .clamp_axes(Vec2::ZERO, Vec2::new(arena.width, arena.height));
    }

    /// Scan the other critters in order. The first breeding partner ends the
    /// scan; every edible critter met before that is eaten.
    fn interact(&mut self, others: &mut PopulationView<'_>, ctx: &mut StepContext<'_>) -> Option<Critter> {
        let population = others.population_size() + ctx.pending_births;

        let mut birth = None;
        let mut partner = String::new();
        for other in others.iter_mut() {
            if self.can_breed(other, population, ctx.limit) {
                birth = Some(self.breed(other, ctx));
                partner = other.name().to_owned();
                break;
            }

            if self.can_eat(other) {
                self.eat(other);
            }
        }

        if let Some(child) = &birth {
            info!(
                event = "critter_born",
                child_id = %child.id,
                child = child.name(),
                parent = self.name(),
                partner = %partner,
                position = %child.position,
                population = population,
                living = others.living() + 1,
                "Critter born"
            );
        }

        birth
    }

    pub fn can_eat(&self, other: &Critter) -> bool {
        if self.is_plant() {
            return false;
        }

        if self.traits.diet.eats_plants() && other.is_plant() {
            return true;
        }

        if self.traits.diet.eats_animals() {
            return match self.traits.feeding_style {
                FeedingStyle::Scavenger => other.is_dead(),
                FeedingStyle::Predator => other.traits.kingdom == Kingdom::Animal,
                FeedingStyle::Grazer => false,
            };
        }

        false
    }

    /// `population` is the population size the soft `limit` is checked against.
    /// Current energy doubles as the proximity threshold.
    pub fn can_breed(&self, other: &Critter, population: usize, limit: usize) -> bool {
        population <= limit
            && self.traits.kingdom == other.traits.kingdom
            && self.traits.feeding_style == other.traits.feeding_style
            && self.breed_cooldown < 0.0
            && other.breed_cooldown < 0.0
            && self.position.distance(&other.position) < self.energy + other.energy
    }

    /// Both sides gain this critter's digestion efficiency
    pub fn eat(&mut self, other: &mut Critter) {
        self.energy += self.traits.digestion_efficiency;
        other.energy += self.traits.digestion_efficiency;
    }

    /// Produce a child with `other`, resetting both parents' cooldowns
    pub fn breed(&mut self, other: &mut Critter, ctx: &mut StepContext<'_>) -> Critter {
        let traits = self.traits.cross(&other.traits, ctx.rng);
        let mut child = ctx.make_critter(traits);

        child.energy = DEFAULT_ENERGY_CAPACITY;
        child.breed_cooldown = child.traits.breed_cooldown * 2.0;
        self.breed_cooldown = self.traits.breed_cooldown * 2.0;
        other.breed_cooldown = other.traits.breed_cooldown * 2.0;

        child.position = self.position;
        child.heading = -self.heading;

        child
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::SyllableNames;
    use proptest::prelude::*;
    use rand::SeedableRng;

    struct Harness {
        config: CritterConfig,
        arena: ArenaConfig,
        rng: ChaCha8Rng,
        ids: IdSequence,
        names: SyllableNames,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                config: CritterConfig::default(),
                arena: ArenaConfig::default(),
                rng: ChaCha8Rng::seed_from_u64(17),
                ids: IdSequence::new(),
                names: SyllableNames,
            }
        }

        fn ctx(&mut self) -> StepContext<'_> {
            StepContext {
                config: &self.config,
                arena: &self.arena,
                limit: 50,
                pending_births: 0,
                rng: &mut self.rng,
                ids: &mut self.ids,
                names: &mut self.names,
            }
        }

        fn critter(&mut self, traits: TraitSet) -> Critter {
            self.ctx().make_critter(traits)
        }
    }

    fn plant() -> TraitSet {
        TraitSet {
            kingdom: Kingdom::Plant,
            diet: Diet::Solar,
            ..TraitSet::default()
        }
    }

    fn animal(diet: Diet, style: FeedingStyle) -> TraitSet {
        TraitSet {
            kingdom: Kingdom::Animal,
            diet,
            feeding_style: style,
            ..TraitSet::default()
        }
    }

    fn tick_alone(h: &mut Harness, critter: &mut Critter) -> TickOutcome {
        let mut empty: [Critter; 0] = [];
        let mut also_empty: [Critter; 0] = [];
        let mut view = PopulationView::new(&mut empty, &mut also_empty);
        let mut ctx = h.ctx();
        critter.tick(&mut view, &mut ctx)
    }

    #[test]
    fn test_plants_share_a_label() {
        let mut h = Harness::new();
        let a = h.critter(plant());
        let b = h.critter(plant());
        let c = h.critter(animal(Diet::Omnivore, FeedingStyle::Predator));

        assert_eq!(a.name(), PLANT_LABEL);
        assert_eq!(b.name(), PLANT_LABEL);
        assert_ne!(a.id, b.id);
        assert_ne!(c.name(), PLANT_LABEL);
        assert_eq!(c.name().len(), 8);
    }

    #[test]
    fn test_radius_follows_current_energy() {
        let mut h = Harness::new();
        let mut c = h.critter(animal(Diet::Omnivore, FeedingStyle::Predator));
        assert_eq!(c.radius(), 10);

        c.energy = 999.0;
        assert_eq!(c.radius(), 9);

        c.energy = 42.0;
        assert_eq!(c.radius(), 0);

        c.energy = -1.0;
        assert_eq!(c.radius(), -1);
    }

    #[test]
    fn test_solar_gain_caps_at_capacity() {
        let mut h = Harness::new();
        let mut p = h.critter(plant());
        p.energy = 995.0;

        tick_alone(&mut h, &mut p);
        assert_eq!(p.energy, 997.0);
        tick_alone(&mut h, &mut p);
        assert_eq!(p.energy, 999.0);
        tick_alone(&mut h, &mut p);
        assert_eq!(p.energy, 1000.0);
        tick_alone(&mut h, &mut p);
        assert_eq!(p.energy, 1000.0);
    }

    #[test]
    fn test_plants_never_move() {
        let mut h = Harness::new();
        let mut p = h.critter(plant());
        p.position = Vec2::new(100.0, 100.0);

        for _ in 0..10 {
            tick_alone(&mut h, &mut p);
        }
        assert_eq!(p.position, Vec2::new(100.0, 100.0));
        assert_eq!(p.heading, Vec2::ZERO);
    }

    #[test]
    fn test_animals_stay_in_bounds_and_under_speed() {
        let mut h = Harness::new();
        let mut a = h.critter(animal(Diet::Carnivore, FeedingStyle::Predator));
        a.traits.drain_per_tick = 0.0;
        a.position = Vec2::new(1.0, 599.0);

        for _ in 0..500 {
            tick_alone(&mut h, &mut a);
            assert!(a.heading.x.abs() <= a.traits.speed);
            assert!(a.heading.y.abs() <= a.traits.speed);
            assert!((0.0..=800.0).contains(&a.position.x));
            assert!((0.0..=600.0).contains(&a.position.y));
        }
    }

    #[test]
    fn test_dead_critter_only_decays() {
        let mut h = Harness::new();
        let mut a = h.critter(animal(Diet::Omnivore, FeedingStyle::Scavenger));
        a.energy = 0.5;
        a.breed_cooldown = 5.0;
        a.position = Vec2::new(50.0, 50.0);

        match tick_alone(&mut h, &mut a) {
            TickOutcome::Dead { just_died, expired } => {
                assert!(just_died);
                assert!(!expired);
            }
            other => panic!("expected death, got {:?}", other),
        }
        assert_eq!(a.decay, 19);

        let decay_before = a.decay;
        match tick_alone(&mut h, &mut a) {
            TickOutcome::Dead { just_died, .. } => assert!(!just_died),
            other => panic!("expected dead, got {:?}", other),
        }
        assert!(a.decay < decay_before);
        assert_eq!(a.breed_cooldown, 5.0);
        assert_eq!(a.position, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_dead_critter_leaves_neighbours_alone() {
        let mut h = Harness::new();
        let mut corpse = h.critter(animal(Diet::Omnivore, FeedingStyle::Predator));
        corpse.energy = -1.0;
        corpse.breed_cooldown = -1.0;

        let mut leaf = h.critter(plant());
        leaf.energy = 500.0;
        let mut prey = h.critter(animal(Diet::Omnivore, FeedingStyle::Predator));
        prey.energy = 700.0;
        prey.breed_cooldown = -1.0;

        let mut before = [leaf];
        let mut after = [prey];
        let outcome = {
            let mut view = PopulationView::new(&mut before, &mut after);
            let mut ctx = h.ctx();
            corpse.tick(&mut view, &mut ctx)
        };

        assert!(matches!(outcome, TickOutcome::Dead { just_died: false, .. }));
        assert_eq!(before[0].energy, 500.0);
        assert_eq!(after[0].energy, 700.0);
        assert_eq!(after[0].breed_cooldown, -1.0);
        assert_eq!(corpse.position, Vec2::ZERO);
    }

    #[test]
    fn test_queued_births_count_toward_limit() {
        let mut h = Harness::new();
        let mut a = h.critter(animal(Diet::Herbivore, FeedingStyle::Grazer));
        a.breed_cooldown = -1.0;
        let mut b = h.critter(animal(Diet::Herbivore, FeedingStyle::Grazer));
        b.breed_cooldown = -1.0;

        let mut before: [Critter; 0] = [];
        let mut after = [b];
        let mut view = PopulationView::new(&mut before, &mut after);
        let mut ctx = h.ctx();
        ctx.limit = 2;
        ctx.pending_births = 1;

        match a.tick(&mut view, &mut ctx) {
            TickOutcome::Active { birth } => assert!(birth.is_none()),
            other => panic!("expected an active critter, got {:?}", other),
        }
    }

    #[test]
    fn test_expires_when_decay_runs_out() {
        let mut h = Harness::new();
        h.config.decay_ticks = 2;
        let mut a = h.critter(animal(Diet::Carnivore, FeedingStyle::Predator));
        a.energy = -10.0;

        assert!(matches!(tick_alone(&mut h, &mut a), TickOutcome::Dead { expired: false, .. }));
        assert!(matches!(tick_alone(&mut h, &mut a), TickOutcome::Dead { expired: true, .. }));
        assert!(a.is_expired());
    }

    #[test]
    fn test_cooldown_stops_at_zero() {
        let mut h = Harness::new();
        let mut p = h.critter(plant());
        p.breed_cooldown = 2.0;

        tick_alone(&mut h, &mut p);
        assert_eq!(p.breed_cooldown, 1.0);
        tick_alone(&mut h, &mut p);
        assert_eq!(p.breed_cooldown, 0.0);
        tick_alone(&mut h, &mut p);
        assert_eq!(p.breed_cooldown, 0.0);
    }

    #[test]
    fn test_fractional_cooldown_overshoots_below_zero() {
        let mut h = Harness::new();
        let mut p = h.critter(plant());
        p.breed_cooldown = 0.25;

        tick_alone(&mut h, &mut p);
        assert_eq!(p.breed_cooldown, -0.75);
    }

    #[test]
    fn test_can_eat_matrix() {
        let mut h = Harness::new();
        let herbivore = h.critter(animal(Diet::Herbivore, FeedingStyle::Grazer));
        let omni_predator = h.critter(animal(Diet::Omnivore, FeedingStyle::Predator));
        let carni_scavenger = h.critter(animal(Diet::Carnivore, FeedingStyle::Scavenger));
        let leaf = h.critter(plant());
        let mut corpse = h.critter(animal(Diet::Herbivore, FeedingStyle::Grazer));
        corpse.energy = -5.0;

        assert!(!leaf.can_eat(&herbivore));
        assert!(!leaf.can_eat(&leaf.clone()));

        assert!(herbivore.can_eat(&leaf));
        assert!(!herbivore.can_eat(&omni_predator));
        assert!(!herbivore.can_eat(&corpse));

        assert!(omni_predator.can_eat(&leaf));
        assert!(omni_predator.can_eat(&herbivore));
        assert!(omni_predator.can_eat(&corpse));

        assert!(!carni_scavenger.can_eat(&leaf));
        assert!(!carni_scavenger.can_eat(&herbivore));
        assert!(carni_scavenger.can_eat(&corpse));
    }

    #[test]
    fn test_eating_feeds_both_sides() {
        let mut h = Harness::new();
        let mut a = h.critter(animal(Diet::Herbivore, FeedingStyle::Grazer));
        a.traits.digestion_efficiency = 1.5;
        let mut p = h.critter(plant());
        a.energy = 100.0;
        p.energy = 200.0;

        a.eat(&mut p);
        assert_eq!(a.energy, 101.5);
        assert_eq!(p.energy, 201.5);
    }

    #[test]
    fn test_can_breed_rules() {
        let mut h = Harness::new();
        let mut a = h.critter(animal(Diet::Carnivore, FeedingStyle::Predator));
        let mut b = h.critter(animal(Diet::Omnivore, FeedingStyle::Predator));
        a.breed_cooldown = -1.0;
        b.breed_cooldown = -1.0;
        a.energy = 10.0;
        b.energy = 10.0;
        a.position = Vec2::new(0.0, 0.0);
        b.position = Vec2::new(15.0, 0.0);

        assert!(a.can_breed(&b, 2, 50));
        // At the limit still allowed, above it not
        assert!(a.can_breed(&b, 50, 50));
        assert!(!a.can_breed(&b, 51, 50));

        b.position = Vec2::new(20.0, 0.0);
        assert!(!a.can_breed(&b, 2, 50));
        b.position = Vec2::new(15.0, 0.0);

        b.breed_cooldown = 0.0;
        assert!(!a.can_breed(&b, 2, 50));
        b.breed_cooldown = -1.0;

        b.traits.feeding_style = FeedingStyle::Scavenger;
        assert!(!a.can_breed(&b, 2, 50));
        b.traits.feeding_style = FeedingStyle::Predator;

        b.traits.kingdom = Kingdom::Plant;
        assert!(!a.can_breed(&b, 2, 50));
    }

    #[test]
    fn test_breed_sets_cooldowns_and_placement() {
        let mut h = Harness::new();
        let mut a = h.critter(animal(Diet::Carnivore, FeedingStyle::Predator));
        let mut b = h.critter(animal(Diet::Carnivore, FeedingStyle::Predator));
        a.traits.breed_cooldown = 300.0;
        b.traits.breed_cooldown = 350.0;
        a.position = Vec2::new(40.0, 60.0);
        a.heading = Vec2::new(1.0, -0.5);

        let child = {
            let mut ctx = h.ctx();
            a.breed(&mut b, &mut ctx)
        };

        assert_eq!(a.breed_cooldown, 600.0);
        assert_eq!(b.breed_cooldown, 700.0);
        assert_eq!(child.breed_cooldown, child.traits.breed_cooldown * 2.0);
        assert!(child.traits.breed_cooldown == 300.0 || child.traits.breed_cooldown == 350.0);
        assert_eq!(child.position, Vec2::new(40.0, 60.0));
        assert_eq!(child.heading, Vec2::new(-1.0, 0.5));
        assert_eq!(child.energy, DEFAULT_ENERGY_CAPACITY);
        assert_ne!(child.id, a.id);
        assert_ne!(child.id, b.id);
    }

    #[test]
    fn test_move_to_keeps_body_inside() {
        let mut h = Harness::new();
        let arena = h.arena.clone();
        let mut a = h.critter(animal(Diet::Omnivore, FeedingStyle::Predator));
        // radius 10
        a.move_to(900.0, 700.0, &arena);
        assert_eq!(a.position, Vec2::new(790.0, 590.0));

        a.move_to(-3.0, -3.0, &arena);
        assert_eq!(a.position, Vec2::new(10.0, 10.0));

        a.move_to(400.0, 300.0, &arena);
        assert_eq!(a.position, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_place_randomly_within_arena() {
        let mut h = Harness::new();
        let arena = h.arena.clone();
        let mut a = h.critter(plant());
        for _ in 0..100 {
            a.place_randomly(&arena, &mut h.rng);
            assert!(a.position.x >= 0.0 && a.position.x < 800.0);
            assert!(a.position.y >= 0.0 && a.position.y < 600.0);
        }
    }

    #[test]
    fn test_sprite() {
        let mut h = Harness::new();
        let mut p = h.critter(plant());
        p.traits.color = Rgb(10, 255, 20);
        let sprite = p.sprite();
        assert_eq!(sprite.shape, Shape::Square);
        assert_eq!(sprite.color, Rgb(10, 255, 20));
        assert_eq!(sprite.radius, 10);
        assert!(sprite.alive);

        let mut a = h.critter(animal(Diet::Carnivore, FeedingStyle::Predator));
        a.energy = -1.0;
        let sprite = a.sprite();
        assert_eq!(sprite.shape, Shape::Circle);
        assert_eq!(sprite.color, Rgb::BLACK);
        assert!(!sprite.alive);
    }

    proptest! {
        #[test]
        fn prop_radius_is_floor_of_energy(energy in -5000.0f64..5000.0) {
            let mut h = Harness::new();
            let mut c = h.critter(animal(Diet::Omnivore, FeedingStyle::Predator));
            c.energy = energy;
            prop_assert_eq!(c.radius(), (energy / 100.0).floor() as i64);
        }

        #[test]
        fn prop_move_to_stays_in_arena(
            x in -2000.0f64..2000.0,
            y in -2000.0f64..2000.0,
            energy in 0.0f64..3000.0,
        ) {
            let mut h = Harness::new();
            let arena = h.arena.clone();
            let mut c = h.critter(animal(Diet::Herbivore, FeedingStyle::Grazer));
            c.energy = energy;
            c.move_to(x, y, &arena);
            prop_assert!(c.position.x >= 0.0 && c.position.x <= arena.width);
            prop_assert!(c.position.y >= 0.0 && c.position.y <= arena.height);
        }
    }
}
