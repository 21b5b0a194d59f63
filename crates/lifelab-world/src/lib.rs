//! World simulation engine.
//!
//! Critters live in a bounded 2D arena, metabolize, wander, eat each other
//! and breed. [`World`] owns the population and drives one step at a time;
//! drawing and pacing are delegated to the collaborators in [`frontend`].

pub mod critter;
pub mod frontend;
pub mod naming;
pub mod phenotype;
pub mod simulation;

pub use critter::{Critter, StepContext, TickOutcome, PLANT_LABEL};
pub use frontend::{
    Backdrop, FixedRatePacer, Frontend, NameSupplier, NullRenderer, Pacer, Renderer, Shape,
    Sprite, StillBackdrop, Unpaced,
};
pub use naming::SyllableNames;
pub use phenotype::{BlendedTrait, TraitKind, TraitSet, DEFAULT_ENERGY_CAPACITY};
pub use simulation::{PopulationView, StepOutcome, TickReport, World};
