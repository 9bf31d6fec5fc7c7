//! Simulation state and the pure physics step.
//!
//! Positions live on the bubbles themselves; velocities are kept in SoA
//! buffers alongside them and never leave the simulation.

use rand::RngCore;

use super::forces::ForceSet;
use crate::chart::Bubble;

/// Cooling and integration parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Alpha below which the simulation settles (default: 0.001).
    pub alpha_min: f64,
    /// Fraction of the distance to `alpha_target` covered each tick (default: ~0.0228).
    pub alpha_decay: f64,
    /// Value alpha decays toward (default: 0.0).
    pub alpha_target: f64,
    /// Fraction of velocity removed each tick (default: 0.2).
    pub velocity_decay: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        let alpha_min = 0.001;
        Self {
            alpha_min,
            alpha_decay: 1.0 - f64::powf(alpha_min, 1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.2,
        }
    }
}

impl SimulationParams {
    /// Whether alpha eventually drops below `alpha_min` on its own.
    ///
    /// False when alpha decays toward a target at or above the threshold,
    /// or does not decay at all.
    pub fn settles(&self) -> bool {
        self.alpha_target < self.alpha_min && self.alpha_decay > 0.0
    }
}

/// Mutable view handed to forces: positions are read-only, velocities are not.
pub struct Nodes<'a> {
    pub bubbles: &'a [Bubble],
    pub vel_x: &'a mut [f64],
    pub vel_y: &'a mut [f64],
}

/// Everything one physics step reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    bubbles: Vec<Bubble>,
    vel_x: Vec<f64>,
    vel_y: Vec<f64>,
    alpha: f64,
    tick: u64,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SimulationState {
    /// Create a hot state (alpha 1) with zero velocities.
    pub fn new(bubbles: Vec<Bubble>) -> Self {
        let n = bubbles.len();
        Self {
            bubbles,
            vel_x: vec![0.0; n],
            vel_y: vec![0.0; n],
            alpha: 1.0,
            tick: 0,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Bubbles in their fixed sequence order.
    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Number of steps taken since this state was created.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    /// Velocity of bubble `index`, if it exists.
    pub fn velocity(&self, index: usize) -> Option<(f64, f64)> {
        Some((*self.vel_x.get(index)?, *self.vel_y.get(index)?))
    }

    /// Split into the view forces operate on.
    pub fn nodes_mut(&mut self) -> Nodes<'_> {
        Nodes {
            bubbles: &self.bubbles,
            vel_x: &mut self.vel_x,
            vel_y: &mut self.vel_y,
        }
    }

    /// Reset alpha to 1, keeping positions and velocities.
    pub(crate) fn reheat(&mut self) {
        self.alpha = 1.0;
    }

    fn integrate(&mut self, velocity_decay: f64) {
        let keep = 1.0 - velocity_decay;
        for (i, bubble) in self.bubbles.iter_mut().enumerate() {
            self.vel_x[i] *= keep;
            self.vel_y[i] *= keep;
            let (x, y) = bubble.position();
            bubble.set_position(x + self.vel_x[i], y + self.vel_y[i]);
        }
    }
}

/// Advance the state by one tick.
///
/// Cools alpha, lets every force adjust velocities at the new alpha, then
/// damps velocities and moves each bubble by its velocity. Sequence order
/// and radii are untouched.
pub fn step(
    mut state: SimulationState,
    forces: &ForceSet,
    params: &SimulationParams,
    rng: &mut dyn RngCore,
) -> SimulationState {
    state.alpha += (params.alpha_target - state.alpha) * params.alpha_decay;

    let alpha = state.alpha;
    forces.apply(state.nodes_mut(), alpha, rng);

    state.integrate(params.velocity_decay);
    state.tick += 1;
    state
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::simulation::forces::PositionForce;

    fn bubble(x: f64, y: f64) -> Bubble {
        Bubble::new(1.0, 5.0, "Health", x, y)
    }

    #[test]
    fn test_new_state_is_hot_and_still() {
        let state = SimulationState::new(vec![bubble(1.0, 2.0), bubble(3.0, 4.0)]);
        assert_eq!(state.alpha(), 1.0);
        assert_eq!(state.tick(), 0);
        assert_eq!(state.velocity(0), Some((0.0, 0.0)));
        assert_eq!(state.velocity(2), None);
    }

    #[test]
    fn test_step_without_forces_only_cools() {
        let params = SimulationParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let state = SimulationState::new(vec![bubble(1.0, 2.0)]);

        let next = step(state, &ForceSet::new(), &params, &mut rng);

        assert_eq!(next.bubbles()[0].position(), (1.0, 2.0));
        assert!(approx_eq!(f64, next.alpha(), 1.0 - params.alpha_decay, ulps = 2));
        assert_eq!(next.tick(), 1);
    }

    #[test]
    fn test_step_applies_velocity_decay() {
        let params = SimulationParams {
            alpha_decay: 0.0,
            ..Default::default()
        };
        let forces = ForceSet::new().with(PositionForce::x(10.0, 0.5));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let state = SimulationState::new(vec![bubble(0.0, 0.0)]);

        let next = step(state, &forces, &params, &mut rng);

        // v = (10 - 0) * 0.5 * 1.0 = 5, damped by 0.8 -> 4
        assert!(approx_eq!(f64, next.velocity(0).unwrap().0, 4.0, ulps = 2));
        assert!(approx_eq!(f64, next.bubbles()[0].x(), 4.0, ulps = 2));
        assert_eq!(next.bubbles()[0].y(), 0.0);
    }

    #[test]
    fn test_step_keeps_order_and_radius() {
        let params = SimulationParams::default();
        let forces = ForceSet::new()
            .with(PositionForce::x(50.0, 0.1))
            .with(PositionForce::y(50.0, 0.1));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let bubbles = vec![
            Bubble::new(9.0, 30.0, "Technology", 0.0, 0.0),
            Bubble::new(3.0, 10.0, "Health", 100.0, 100.0),
        ];
        let state = SimulationState::new(bubbles);

        let next = step(state, &forces, &params, &mut rng);

        assert_eq!(next.bubbles()[0].category(), "Technology");
        assert_eq!(next.bubbles()[0].radius(), 30.0);
        assert_eq!(next.bubbles()[1].category(), "Health");
        assert_eq!(next.bubbles()[1].radius(), 10.0);
    }

    #[test]
    fn test_settles() {
        assert!(SimulationParams::default().settles());

        let warm = SimulationParams {
            alpha_target: 0.001,
            ..Default::default()
        };
        assert!(!warm.settles());

        let frozen = SimulationParams {
            alpha_decay: 0.0,
            ..Default::default()
        };
        assert!(!frozen.settles());
    }

    #[test]
    fn test_reheat() {
        let mut state = SimulationState::new(vec![bubble(0.0, 0.0)]).with_alpha(0.01);
        state.reheat();
        assert_eq!(state.alpha(), 1.0);
    }
}
