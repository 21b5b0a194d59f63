//! Contracts for the collaborators that sit around the simulation: pacing,
//! background, drawing and display names.

use lifelab_core::{Rgb, Vec2};
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

/// Produces display names for new critters
pub trait NameSupplier {
    fn make_name(&mut self, len: usize, rng: &mut ChaCha8Rng) -> String;
}

/// Advances the clock between steps and reports whether to stop
pub trait Pacer {
    /// Block until the next step is due at `tick_rate` steps per second
    fn pace(&mut self, tick_rate: u32);

    fn quit_requested(&mut self) -> bool;
}

/// Supplies the background beneath the critters
pub trait Backdrop {
    /// Move to the next frame, looping at end of stream
    fn advance(&mut self);
}

/// Draws critters once per step, after all logic has run
pub trait Renderer {
    fn begin_frame(&mut self) {}

    fn draw(&mut self, sprite: &Sprite);

    fn end_frame(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Filled square with side `2 * radius`, anchored at the position
    Square,
    /// Filled circle centered on the position
    Circle,
}

/// Everything a renderer needs to draw one critter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub shape: Shape,
    pub color: Rgb,
    pub position: Vec2,
    pub radius: i64,
    pub alive: bool,
}

/// The collaborators a world step talks to
pub struct Frontend<P, B, R> {
    pub pacer: P,
    pub backdrop: B,
    pub renderer: R,
}

impl<P: Pacer, B: Backdrop, R: Renderer> Frontend<P, B, R> {
    pub fn new(pacer: P, backdrop: B, renderer: R) -> Self {
        Self {
            pacer,
            backdrop,
            renderer,
        }
    }
}

/// Runs as fast as possible and never asks to quit on its own
#[derive(Debug, Clone, Default)]
pub struct Unpaced {
    quit: Option<Arc<AtomicBool>>,
}

impl Unpaced {
    pub fn with_quit_flag(quit: Arc<AtomicBool>) -> Self {
        Self { quit: Some(quit) }
    }
}

impl Pacer for Unpaced {
    fn pace(&mut self, _tick_rate: u32) {}

    fn quit_requested(&mut self) -> bool {
        self.quit
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Sleeps so that consecutive steps are at least `1 / tick_rate` apart
#[derive(Debug)]
pub struct FixedRatePacer {
    last: Option<Instant>,
    quit: Arc<AtomicBool>,
}

impl FixedRatePacer {
    pub fn new(quit: Arc<AtomicBool>) -> Self {
        Self { last: None, quit }
    }
}

impl Pacer for FixedRatePacer {
    fn pace(&mut self, tick_rate: u32) {
        if tick_rate == 0 {
            return;
        }

        let frame = Duration::from_secs(1) / tick_rate;
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < frame {
                std::thread::sleep(frame - elapsed);
            } else {
                trace!(behind_ms = (elapsed - frame).as_millis() as u64, "Step running late");
            }
        }
        self.last = Some(Instant::now());
    }

    fn quit_requested(&mut self) -> bool {
        self.quit.load(Ordering::Relaxed)
    }
}

/// A background that never changes
#[derive(Debug, Clone, Copy, Default)]
pub struct StillBackdrop;

impl Backdrop for StillBackdrop {
    fn advance(&mut self) {}
}

/// Discards all draw calls
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw(&mut self, _sprite: &Sprite) {}
}
