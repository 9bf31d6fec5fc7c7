//! Simulation - the tick-driven layout engine.
//!
//! A [`Simulation`] owns one run's bubbles and advances them one step per
//! [`Simulation::tick`]. The stepping mechanism (animation frame, timer,
//! plain loop) belongs to the caller; the engine only says whether a tick
//! happened. Snapshots are available through [`Simulation::ticks`] for
//! callers that prefer an iterator, or [`Simulation::run`] for a callback.

use log::{debug, info, trace, warn};
use rand::RngCore;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use super::forces::ForceSet;
use super::state::{SimulationParams, SimulationState, step};
use crate::chart::Bubble;
use crate::error::LayoutError;

/// Lifecycle of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulationStatus {
    /// No bubbles attached.
    Idle,
    /// Alpha is above the threshold; ticks advance the layout.
    Running,
    /// Settled or stopped by the caller. Ticks do nothing until restarted.
    Stopped,
}

/// The state of one run after a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Run this snapshot belongs to.
    pub generation: u64,
    /// Ticks taken in this run.
    pub tick: u64,
    pub alpha: f64,
    pub bubbles: Vec<Bubble>,
}

/// Force-directed bubble layout.
#[derive(Debug)]
pub struct Simulation<R = ChaCha8Rng> {
    params: SimulationParams,
    forces: ForceSet,
    state: SimulationState,
    status: SimulationStatus,
    generation: u64,
    rng: R,
}

impl<R: RngCore> Simulation<R> {
    /// Create an idle simulation.
    pub fn new(params: SimulationParams, forces: ForceSet, rng: R) -> Self {
        Self {
            params,
            forces,
            state: SimulationState::default(),
            status: SimulationStatus::Idle,
            generation: 0,
            rng,
        }
    }

    /// Attach a new bubble set and start it hot (alpha 1).
    ///
    /// Any previous run is replaced; its generation is retired so tick
    /// sources driving it can notice. Empty input settles immediately and
    /// never ticks.
    ///
    /// Returns the generation of the new run, or an error (leaving the
    /// current run untouched) if any bubble has a non-finite radius or
    /// position.
    pub fn start(&mut self, bubbles: Vec<Bubble>) -> Result<u64, LayoutError> {
        if let Some(index) = bubbles.iter().position(|b| !b.is_finite()) {
            return Err(LayoutError::NonFiniteBubble { index });
        }

        self.generation += 1;
        self.status = if bubbles.is_empty() {
            SimulationStatus::Stopped
        } else {
            SimulationStatus::Running
        };
        self.state = SimulationState::new(bubbles);

        debug!(
            generation = self.generation,
            count = self.state.len();
            "Simulation started"
        );
        Ok(self.generation)
    }

    /// Advance one step.
    ///
    /// Returns the updated bubbles, or `None` if the simulation is not
    /// running. The tick that brings alpha below the threshold still
    /// returns its bubbles; the next one does not.
    pub fn tick(&mut self) -> Option<&[Bubble]> {
        if self.status != SimulationStatus::Running {
            return None;
        }

        let state = std::mem::take(&mut self.state);
        self.state = step(state, &self.forces, &self.params, &mut self.rng);

        trace!(tick = self.state.tick(), alpha = self.state.alpha(); "Simulation tick");

        if self.state.alpha() < self.params.alpha_min {
            self.status = SimulationStatus::Stopped;
            info!(
                generation = self.generation,
                ticks = self.state.tick();
                "Simulation settled"
            );
        }

        Some(self.state.bubbles())
    }

    /// Tick until settled or stopped, calling `on_tick` after every step.
    ///
    /// Returns the number of ticks taken. When the parameters never let
    /// alpha settle (see [`SimulationParams::settles`]) this returns 0
    /// without ticking; drive such runs with [`tick`](Self::tick) or
    /// [`ticks`](Self::ticks) instead.
    pub fn run<F>(&mut self, mut on_tick: F) -> u64
    where
        F: FnMut(&[Bubble]),
    {
        if self.is_running() && !self.params.settles() {
            warn!(
                alpha_min = self.params.alpha_min,
                alpha_target = self.params.alpha_target,
                alpha_decay = self.params.alpha_decay;
                "Simulation never settles; not running to completion"
            );
            return 0;
        }

        let mut ticks = 0;
        while let Some(bubbles) = self.tick() {
            on_tick(bubbles);
            ticks += 1;
        }
        ticks
    }

    /// Lazy sequence of snapshots, one per tick.
    ///
    /// Ends when the simulation settles or is stopped. After
    /// [`restart`](Self::restart) a new call yields again.
    pub fn ticks(&mut self) -> Ticks<'_, R> {
        Ticks { simulation: self }
    }

    /// Stop ticking. Calling it again, or on a settled run, does nothing.
    pub fn stop(&mut self) {
        if self.status == SimulationStatus::Running {
            self.status = SimulationStatus::Stopped;
            debug!(generation = self.generation, ticks = self.state.tick(); "Simulation stopped");
        }
    }

    /// Reheat to alpha 1 and resume from the current positions.
    ///
    /// Does nothing when idle or when the run has no bubbles.
    pub fn restart(&mut self) {
        if self.state.is_empty() {
            return;
        }
        self.state.reheat();
        self.status = SimulationStatus::Running;
        debug!(generation = self.generation; "Simulation restarted");
    }

    /// Detach the current bubbles and go idle.
    pub fn clear(&mut self) {
        self.state = SimulationState::default();
        self.status = SimulationStatus::Idle;
        self.generation += 1;
    }

    /// Copy of the current run's state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            generation: self.generation,
            tick: self.state.tick(),
            alpha: self.state.alpha(),
            bubbles: self.state.bubbles().to_vec(),
        }
    }

    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SimulationStatus::Running
    }

    pub fn alpha(&self) -> f64 {
        self.state.alpha()
    }

    pub fn bubbles(&self) -> &[Bubble] {
        self.state.bubbles()
    }

    /// Identifier of the current run; bumped by every `start` and `clear`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tick_count(&self) -> u64 {
        self.state.tick()
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn forces(&self) -> &ForceSet {
        &self.forces
    }
}

/// Iterator over per-tick snapshots. See [`Simulation::ticks`].
pub struct Ticks<'a, R> {
    simulation: &'a mut Simulation<R>,
}

impl<R: RngCore> Iterator for Ticks<'_, R> {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        self.simulation.tick()?;
        Some(self.simulation.snapshot())
    }
}
