//! Force simulation for bubble layout.
//!
//! Bubbles start scattered and are relaxed toward a centered, mostly
//! non-overlapping arrangement by a few forces: a weak pull toward the
//! canvas center and a repulsion proportional to each bubble's area. An
//! internal "temperature" (alpha) decays every tick; the simulation
//! settles once it drops below a threshold.
//!
//! - `state`: simulation state and the pure [`step`] function
//! - `forces`: the [`Force`] trait and its implementations
//! - `engine`: the [`Simulation`] state machine driven by the caller

mod engine;
mod forces;
mod quadtree;
mod state;

pub use engine::{Simulation, SimulationStatus, Snapshot, Ticks};
pub use forces::{Axis, Force, ForceSet, ManyBodyForce, PositionForce};
pub use state::{Nodes, SimulationParams, SimulationState, step};
