//! Strategy orchestration: an explicit state machine over the
//! detection strategies.
//!
//! ```text
//! StructuralAdaptive ──empty──▶ StructuralOtsu ──empty──▶ Edge
//!        │ found                     │ found                │
//!        ▼                           ▼                      ▼
//!        └──────────────────▶ ColorClusterCheck ◀───────────┘
//!                                    │
//!                                    ▼
//!                              FallbackCheck ──▶ Done
//! ```
//!
//! [`Orchestrator::step`] performs exactly one transition, so callers
//! (and tests) can observe every intermediate state. [`Orchestrator::run`]
//! drives the machine to [`State::Done`]. A fresh orchestrator is built
//! for every invocation; nothing carries over between images.
//!
//! Strategies are looked up through [`Strategies`]; [`Builtin`] runs the
//! real segmenters.
//!
//! # Escalation rules
//!
//! - Otsu runs only when the adaptive pass found nothing; edges run only
//!   when both structural passes found nothing.
//! - Color clustering runs whenever the current best has at most two
//!   regions, and replaces it only with strictly more regions.
//! - The fallback rectangle runs only when everything else came back
//!   empty, so the final region set is never empty.

use image::RgbImage;
use web_time::Instant;

use crate::diagnostics::StrategyAttempt;
use crate::strategy::{Scene, Strategy, StrategyKind};
use crate::types::{Polygon, RegionLimits};

/// Resolves a [`StrategyKind`] to the regions it finds in a scene.
pub trait Strategies {
    /// Run the strategy named by `kind`.
    fn run(&self, kind: StrategyKind, scene: &Scene<'_>, limits: &RegionLimits) -> Vec<Polygon>;
}

/// The segmenters shipped with this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Builtin;

impl Strategies for Builtin {
    fn run(&self, kind: StrategyKind, scene: &Scene<'_>, limits: &RegionLimits) -> Vec<Polygon> {
        Strategy::run(&kind, scene, limits)
    }
}

/// Color clustering is attempted while the current best has at most
/// this many regions.
pub const CLUSTER_ESCALATION_MAX: usize = 2;

/// Orchestrator states, in the order they are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Run the adaptive threshold pass.
    StructuralAdaptive,
    /// Run the Otsu threshold pass.
    StructuralOtsu,
    /// Run the edge strategy.
    Edge,
    /// Maybe run color clustering and apply the replacement rule.
    ColorClusterCheck,
    /// Maybe synthesize the fallback rectangle.
    FallbackCheck,
    /// Finished; [`Orchestrator::into_outcome`] yields the result.
    Done,
}

/// Final result of an orchestrator run.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// The selected region set, largest first.
    pub regions: Vec<Polygon>,
    /// Strategy whose output was kept.
    pub selected: StrategyKind,
    /// Every strategy that ran, in order.
    pub attempts: Vec<StrategyAttempt>,
}

/// Drives the detection strategies for one image.
#[derive(Debug)]
pub struct Orchestrator<'a, S = Builtin> {
    scene: Scene<'a>,
    limits: RegionLimits,
    strategies: S,
    state: State,
    current: Vec<Polygon>,
    selected: StrategyKind,
    attempts: Vec<StrategyAttempt>,
}

impl<'a> Orchestrator<'a> {
    /// Prepare a run of the built-in strategies over `image` with fixed
    /// `limits`.
    #[must_use]
    pub fn new(image: &'a RgbImage, limits: RegionLimits) -> Self {
        Self::with_strategies(image, limits, Builtin)
    }
}

impl<'a, S: Strategies> Orchestrator<'a, S> {
    /// Prepare a run over `image` using `strategies`.
    #[must_use]
    pub fn with_strategies(image: &'a RgbImage, limits: RegionLimits, strategies: S) -> Self {
        Self {
            scene: Scene::new(image),
            limits,
            strategies,
            state: State::StructuralAdaptive,
            current: Vec::new(),
            selected: StrategyKind::Fallback,
            attempts: Vec::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Current best region set.
    #[must_use]
    pub fn current(&self) -> &[Polygon] {
        &self.current
    }

    /// Strategies run so far.
    #[must_use]
    pub fn attempts(&self) -> &[StrategyAttempt] {
        &self.attempts
    }

    /// Perform one transition. A no-op once [`State::Done`] is reached.
    pub fn step(&mut self) {
        self.state = match self.state {
            State::StructuralAdaptive => {
                self.take_if_found(StrategyKind::StructuralAdaptive, State::StructuralOtsu)
            }
            State::StructuralOtsu => self.take_if_found(StrategyKind::StructuralOtsu, State::Edge),
            State::Edge => {
                let found = self.attempt(StrategyKind::Edge);
                if !found.is_empty() {
                    self.selected = StrategyKind::Edge;
                }
                self.current = found;
                State::ColorClusterCheck
            }
            State::ColorClusterCheck => {
                if self.current.len() <= CLUSTER_ESCALATION_MAX {
                    let found = self.attempt(StrategyKind::ColorCluster);
                    if found.len() > self.current.len() {
                        self.current = found;
                        self.selected = StrategyKind::ColorCluster;
                    }
                }
                State::FallbackCheck
            }
            State::FallbackCheck => {
                if self.current.is_empty() {
                    self.current = self.attempt(StrategyKind::Fallback);
                    self.selected = StrategyKind::Fallback;
                }
                State::Done
            }
            State::Done => State::Done,
        };
    }

    /// Step until [`State::Done`] and return the outcome.
    #[must_use]
    pub fn run(mut self) -> Outcome {
        while self.state != State::Done {
            self.step();
        }
        self.into_outcome()
    }

    /// Consume the orchestrator, returning whatever it holds now.
    #[must_use]
    pub fn into_outcome(self) -> Outcome {
        log::debug!(
            "selected {} with {} regions",
            self.selected.name(),
            self.current.len(),
        );
        Outcome {
            regions: self.current,
            selected: self.selected,
            attempts: self.attempts,
        }
    }

    /// Run a structural pass; keep its result and skip ahead to the
    /// cluster check if it found anything, otherwise move to `next`.
    fn take_if_found(&mut self, kind: StrategyKind, next: State) -> State {
        let found = self.attempt(kind);
        if found.is_empty() {
            next
        } else {
            self.current = found;
            self.selected = kind;
            State::ColorClusterCheck
        }
    }

    fn attempt(&mut self, kind: StrategyKind) -> Vec<Polygon> {
        let start = Instant::now();
        let found = self.strategies.run(kind, &self.scene, &self.limits);
        let duration = start.elapsed();
        log::debug!(
            "{} found {} regions in {:.3}ms",
            kind.name(),
            found.len(),
            duration.as_secs_f64() * 1000.0,
        );
        self.attempts.push(StrategyAttempt {
            strategy: kind,
            region_count: found.len(),
            duration,
        });
        found
    }
}
