//! Population controller: owns the critters and drives one step at a time.

use crate::critter::{Critter, StepContext, TickOutcome};
use crate::frontend::{Backdrop, Frontend, NameSupplier, Pacer, Renderer};
use crate::naming::SyllableNames;
use crate::phenotype::TraitSet;
use lifelab_core::{
    CritterId, IdSequence, LifecycleCounters, PopulationStats, Result, RunSummary, SimConfig,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

/// The other members of the population as seen by the critter taking its step.
///
/// Covers only critters present when the sweep began, in population order,
/// and hides any that expired earlier in the same sweep.
pub struct PopulationView<'a> {
    before: &'a mut [Critter],
    after: &'a mut [Critter],
}

impl<'a> PopulationView<'a> {
    pub fn new(before: &'a mut [Critter], after: &'a mut [Critter]) -> Self {
        Self { before, after }
    }

    /// Population size at the start of the sweep, including the acting critter
    pub fn population_size(&self) -> usize {
        self.before.len() + self.after.len() + 1
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Critter> + '_ {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .filter(|c| !c.is_expired())
    }

    /// Living critters other than the acting one
    pub fn living(&self) -> usize {
        self.before
            .iter()
            .chain(self.after.iter())
            .filter(|c| !c.is_dead())
            .count()
    }
}

/// What happened during one [`World::tick`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub births: Vec<CritterId>,
    pub deaths: Vec<CritterId>,
    pub removals: Vec<CritterId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Quit,
}

pub struct World {
    critters: Vec<Critter>,
    config: SimConfig,
    rng: ChaCha8Rng,
    ids: IdSequence,
    names: Box<dyn NameSupplier + Send>,
    tick: u64,
    lifecycle: LifecycleCounters,
}

impl World {
    /// An empty world; call [`World::seed_population`] to add the initial critters
    pub fn new(config: SimConfig) -> Result<Self> {
        Self::with_names(config, Box::new(SyllableNames))
    }

    pub fn with_names(config: SimConfig, names: Box<dyn NameSupplier + Send>) -> Result<Self> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(Self {
            critters: Vec::new(),
            config,
            rng,
            ids: IdSequence::new(),
            names,
            tick: 0,
            lifecycle: LifecycleCounters::default(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn lifecycle(&self) -> LifecycleCounters {
        self.lifecycle
    }

    pub fn critters(&self) -> &[Critter] {
        &self.critters
    }

    pub fn len(&self) -> usize {
        self.critters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.critters.is_empty()
    }

    pub fn get(&self, id: CritterId) -> Option<&Critter> {
        self.critters.iter().find(|c| c.id == id)
    }

    fn context(&mut self) -> StepContext<'_> {
        StepContext {
            config: &self.config.critter,
            arena: &self.config.arena,
            limit: self.config.population.limit,
            pending_births: 0,
            rng: &mut self.rng,
            ids: &mut self.ids,
            names: self.names.as_mut(),
        }
    }

    /// Build a critter with the given traits without adding it
    pub fn make_critter(&mut self, traits: TraitSet) -> Critter {
        self.context().make_critter(traits)
    }

    /// Append a critter built elsewhere
    pub fn insert(&mut self, critter: Critter) -> CritterId {
        let id = critter.id;
        self.critters.push(critter);
        id
    }

    /// Add a randomized critter at a random position
    pub fn spawn_random(&mut self) -> CritterId {
        let traits = TraitSet::random(&mut self.rng);
        let mut critter = self.make_critter(traits);
        critter.place_randomly(&self.config.arena, &mut self.rng);
        self.insert(critter)
    }

    /// Add `population.initial_count` randomized critters
    pub fn seed_population(&mut self) {
        for _ in 0..self.config.population.initial_count {
            self.spawn_random();
        }
        info!(
            count = self.critters.len(),
            seed = self.config.seed,
            "Seeded initial population"
        );
    }

    /// One full frame: pace, refresh the backdrop, check for quit, run the
    /// logic, then draw.
    pub fn step<P: Pacer, B: Backdrop, R: Renderer>(
        &mut self,
        frontend: &mut Frontend<P, B, R>,
    ) -> StepOutcome {
        frontend.pacer.pace(self.config.population.tick_rate);
        frontend.backdrop.advance();
        if frontend.pacer.quit_requested() {
            return StepOutcome::Quit;
        }

        self.tick();

        frontend.renderer.begin_frame();
        for critter in &self.critters {
            frontend.renderer.draw(&critter.sprite());
        }
        frontend.renderer.end_frame();

        StepOutcome::Continue
    }

    /// Step until `max_steps` elapse or the frontend asks to quit
    #[instrument(skip(self, frontend), fields(seed = self.config.seed, max_steps = ?self.config.max_steps))]
    pub fn run<P: Pacer, B: Backdrop, R: Renderer>(
        &mut self,
        frontend: &mut Frontend<P, B, R>,
    ) -> RunSummary {
        info!("Starting simulation with {} critters", self.critters.len());

        let mut steps = 0;
        let mut quit_requested = false;
        while self.config.max_steps.map_or(true, |max| steps < max) {
            if self.step(frontend) == StepOutcome::Quit {
                quit_requested = true;
                break;
            }
            steps += 1;
        }

        let summary = RunSummary {
            seed: self.config.seed,
            steps,
            quit_requested,
            lifecycle: self.lifecycle,
            final_population: self.stats(),
        };

        info!(
            event = "run_complete",
            steps = summary.steps,
            quit_requested = summary.quit_requested,
            births = summary.lifecycle.births,
            deaths = summary.lifecycle.deaths,
            removals = summary.lifecycle.removals,
            final_population = summary.final_population.total,
            living = summary.final_population.living,
            "Simulation finished"
        );

        summary
    }

    /// Run every critter present at the start of the sweep, then add the
    /// newborns and detach the expired.
    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        let snapshot_len = self.critters.len();
        let mut pending_births = Vec::new();

        let mut ctx = StepContext {
            config: &self.config.critter,
            arena: &self.config.arena,
            limit: self.config.population.limit,
            pending_births: 0,
            rng: &mut self.rng,
            ids: &mut self.ids,
            names: self.names.as_mut(),
        };

        for index in 0..snapshot_len {
            let (before, rest) = self.critters.split_at_mut(index);
            let Some((critter, after)) = rest.split_first_mut() else {
                break;
            };
            if critter.is_expired() {
                continue;
            }

            let mut view = PopulationView::new(before, after);
            match critter.tick(&mut view, &mut ctx) {
                TickOutcome::Active { birth } => {
                    if let Some(child) = birth {
                        pending_births.push(child);
                        ctx.pending_births = pending_births.len();
                    }
                }
                TickOutcome::Dead { just_died, expired } => {
                    if just_died {
                        debug!(
                            event = "critter_died",
                            critter_id = %critter.id,
                            name = critter.name(),
                            tick = self.tick,
                            "Critter died"
                        );
                        report.deaths.push(critter.id);
                    }
                    if expired {
                        report.removals.push(critter.id);
                    }
                }
            }
        }

        for child in pending_births {
            report.births.push(child.id);
            self.critters.push(child);
        }

        if !report.removals.is_empty() {
            self.critters.retain(|c| !c.is_expired());
            for id in &report.removals {
                debug!(event = "critter_removed", critter_id = %id, tick = self.tick, "Critter removed");
            }
        }

        self.lifecycle.births += report.births.len() as u64;
        self.lifecycle.deaths += report.deaths.len() as u64;
        self.lifecycle.removals += report.removals.len() as u64;

        if self.tick % self.config.population.metrics_interval == 0 {
            self.emit_population_metrics();
        }

        report
    }

    pub fn stats(&self) -> PopulationStats {
        let mut stats = PopulationStats::new(self.tick);
        for critter in &self.critters {
            stats.record(
                critter.traits.kingdom,
                critter.traits.diet,
                critter.energy,
                !critter.is_dead(),
            );
        }
        stats
    }

    fn emit_population_metrics(&self) {
        let stats = self.stats();
        info!(
            event = "population_metrics",
            tick = stats.tick,
            total = stats.total,
            living = stats.living,
            dead = stats.dead,
            plants = stats.plants,
            animals = stats.animals,
            avg_energy = stats.avg_energy,
            max_energy = stats.max_energy,
            births = self.lifecycle.births,
            deaths = self.lifecycle.deaths,
            removals = self.lifecycle.removals,
            "Population metrics snapshot"
        );
    }
}
