//! Forces acting on bubbles.
//!
//! A force reads bubble positions and adds to velocities, scaled by the
//! current alpha. The bubble chart uses three: a weak pull toward the
//! canvas center on each axis and a radius-squared repulsion between all
//! bubbles.

use std::fmt;

use rand::{Rng, RngCore};

use super::quadtree::{ChargeParams, QuadTree};
use super::state::Nodes;
use crate::chart::Bubble;
use crate::config::ChartConfig;

/// A rule that adjusts bubble velocities once per tick.
pub trait Force: fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Add this force's contribution to every bubble's velocity.
    fn apply(&self, nodes: Nodes<'_>, alpha: f64, rng: &mut dyn RngCore);
}

/// Coordinate axis a [`PositionForce`] acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Pulls every bubble toward a target coordinate on one axis.
///
/// `v += (target - p) * strength * alpha`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionForce {
    axis: Axis,
    target: f64,
    strength: f64,
}

impl PositionForce {
    pub fn new(axis: Axis, target: f64, strength: f64) -> Self {
        Self {
            axis,
            target,
            strength,
        }
    }

    pub fn x(target: f64, strength: f64) -> Self {
        Self::new(Axis::X, target, strength)
    }

    pub fn y(target: f64, strength: f64) -> Self {
        Self::new(Axis::Y, target, strength)
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }
}

impl Force for PositionForce {
    fn name(&self) -> &'static str {
        match self.axis {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }

    fn apply(&self, nodes: Nodes<'_>, alpha: f64, _rng: &mut dyn RngCore) {
        let k = self.strength * alpha;
        match self.axis {
            Axis::X => {
                for (bubble, vx) in nodes.bubbles.iter().zip(nodes.vel_x.iter_mut()) {
                    *vx += (self.target - bubble.x()) * k;
                }
            }
            Axis::Y => {
                for (bubble, vy) in nodes.bubbles.iter().zip(nodes.vel_y.iter_mut()) {
                    *vy += (self.target - bubble.y()) * k;
                }
            }
        }
    }
}

/// Mutual repulsion with per-bubble charge `-(radius^2) * strength`.
///
/// Uses a Barnes-Hut quadtree: a cell far enough away (relative to
/// `theta`) acts as a single charge at its centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManyBodyForce {
    strength: f64,
    theta: f64,
    distance_min: f64,
    distance_max: Option<f64>,
}

impl ManyBodyForce {
    /// Create a charge force with theta 0.9, minimum distance 1 and no
    /// maximum distance.
    pub fn new(strength: f64) -> Self {
        Self {
            strength,
            theta: 0.9,
            distance_min: 1.0,
            distance_max: None,
        }
    }

    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_distance_min(mut self, distance_min: f64) -> Self {
        self.distance_min = distance_min;
        self
    }

    pub fn with_distance_max(mut self, distance_max: Option<f64>) -> Self {
        self.distance_max = distance_max;
        self
    }

    /// Charge of a bubble. Negative values repel.
    pub fn charge(&self, bubble: &Bubble) -> f64 {
        -bubble.radius().powi(2) * self.strength
    }

    fn params(&self) -> ChargeParams {
        ChargeParams {
            theta2: self.theta * self.theta,
            distance_min2: self.distance_min * self.distance_min,
            distance_max2: self.distance_max.map_or(f64::INFINITY, |d| d * d),
        }
    }
}

impl Force for ManyBodyForce {
    fn name(&self) -> &'static str {
        "charge"
    }

    fn apply(&self, nodes: Nodes<'_>, alpha: f64, rng: &mut dyn RngCore) {
        let charges: Vec<f64> = nodes.bubbles.iter().map(|b| self.charge(b)).collect();
        let tree = QuadTree::build(nodes.bubbles, &charges);
        let params = self.params();
        let mut stack = Vec::new();

        for i in 0..nodes.bubbles.len() {
            let (dvx, dvy) =
                tree.force_on(i, nodes.bubbles, &charges, &params, alpha, &mut stack, rng);
            nodes.vel_x[i] += dvx;
            nodes.vel_y[i] += dvy;
        }
    }
}

/// Small random offset used to separate coincident bubbles.
pub(crate) fn jiggle(rng: &mut dyn RngCore) -> f64 {
    (rng.r#gen::<f64>() - 0.5) * 1e-6
}

/// Ordered collection of forces, applied in insertion order.
#[derive(Debug, Default)]
pub struct ForceSet {
    forces: Vec<Box<dyn Force>>,
}

impl ForceSet {
    pub fn new() -> Self {
        Self { forces: Vec::new() }
    }

    /// The bubble chart's forces: centering on x and y, then charge.
    pub fn bubble_chart(config: &ChartConfig) -> Self {
        let (cx, cy) = config.center();
        Self::new()
            .with(PositionForce::x(cx, config.force_strength))
            .with(PositionForce::y(cy, config.force_strength))
            .with(
                ManyBodyForce::new(config.force_strength)
                    .with_theta(config.theta)
                    .with_distance_min(config.distance_min)
                    .with_distance_max(config.distance_max),
            )
    }

    pub fn with(mut self, force: impl Force + 'static) -> Self {
        self.push(force);
        self
    }

    pub fn push(&mut self, force: impl Force + 'static) {
        self.forces.push(Box::new(force));
    }

    pub fn len(&self) -> usize {
        self.forces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    /// Force names in application order.
    pub fn names(&self) -> Vec<&'static str> {
        self.forces.iter().map(|f| f.name()).collect()
    }

    pub fn apply(&self, mut nodes: Nodes<'_>, alpha: f64, rng: &mut dyn RngCore) {
        for force in &self.forces {
            let view = Nodes {
                bubbles: nodes.bubbles,
                vel_x: &mut *nodes.vel_x,
                vel_y: &mut *nodes.vel_y,
            };
            force.apply(view, alpha, rng);
        }
    }
}
