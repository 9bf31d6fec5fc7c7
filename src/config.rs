//! Configuration for bubble chart layout.
//!
//! [`ChartConfig`] controls canvas size, radius sizing, force coefficients
//! and simulation cooling. Every field has a default, so JS callers may pass
//! a partial object (field names in camelCase) or nothing at all.
//!
//! # Example
//!
//! ```
//! # use bubble_chart_wasm::config::ChartConfig;
//! let config = ChartConfig {
//!     width: 640.0,
//!     height: 480.0,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! assert_eq!(config.center(), (320.0, 240.0));
//! ```

use serde::Deserialize;

use crate::error::ConfigError;
use crate::simulation::SimulationParams;

/// Default category colors, in palette order.
pub const DEFAULT_PALETTE: [&str; 4] = ["#0E1756", "#AABD9C", "#DBD3CD", "#BE9F83"];

/// Upper bound of the radius scale's input domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RadiusDomain {
    /// `[0, max * value_factor]`: the largest value reaches the top of
    /// `radius_range`.
    #[default]
    Scaled,
    /// `[0, max]`: scaled values are measured against the unscaled maximum,
    /// so every bubble shrinks by `sqrt(value_factor)` at the default
    /// exponent.
    MaxValue,
}

/// Top-level chart configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    /// Canvas width (default: 333.0).
    pub width: f64,
    /// Canvas height (default: 205.0).
    pub height: f64,
    /// Centering strength and charge coefficient (default: 0.03).
    pub force_strength: f64,
    /// Fraction of velocity removed each tick (default: 0.2).
    pub velocity_decay: f64,
    /// Radius scale output range `[min, max]` (default: [2.0, 85.0]).
    pub radius_range: [f64; 2],
    /// Radius scale exponent (default: 0.5).
    pub radius_exponent: f64,
    /// Multiplier applied to each value before scaling (default: 0.4).
    pub value_factor: f64,
    /// Radius scale domain (default: `scaled`).
    pub radius_domain: RadiusDomain,
    /// Alpha below which the simulation settles (default: 0.001).
    pub alpha_min: f64,
    /// Per-tick alpha decay rate (default: `1 - alpha_min^(1/300)`).
    pub alpha_decay: f64,
    /// Value alpha decays toward (default: 0.0).
    pub alpha_target: f64,
    /// Barnes-Hut opening criterion (default: 0.9).
    pub theta: f64,
    /// Minimum distance used for charge (default: 1.0).
    pub distance_min: f64,
    /// Maximum distance over which charge applies (default: unbounded).
    pub distance_max: Option<f64>,
    /// Seed for initial placement; `None` seeds from host entropy.
    pub seed: Option<u64>,
    /// Ordered category colors.
    pub palette: Vec<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        let alpha_min = 0.001;
        Self {
            width: 333.0,
            height: 205.0,
            force_strength: 0.03,
            velocity_decay: 0.2,
            radius_range: [2.0, 85.0],
            radius_exponent: 0.5,
            value_factor: 0.4,
            radius_domain: RadiusDomain::Scaled,
            alpha_min,
            alpha_decay: 1.0 - f64::powf(alpha_min, 1.0 / 300.0),
            alpha_target: 0.0,
            theta: 0.9,
            distance_min: 1.0,
            distance_max: None,
            seed: None,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ChartConfig {
    /// Canvas center that the centering forces pull toward.
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Cooling and integration parameters for the simulation.
    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams {
            alpha_min: self.alpha_min,
            alpha_decay: self.alpha_decay,
            alpha_target: self.alpha_target,
            velocity_decay: self.velocity_decay,
        }
    }

    /// Check every field for a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(ConfigError::invalid("width", "must be finite and positive"));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(ConfigError::invalid("height", "must be finite and positive"));
        }
        if !self.force_strength.is_finite() {
            return Err(ConfigError::invalid("forceStrength", "must be finite"));
        }
        if !in_unit_interval(self.velocity_decay) {
            return Err(ConfigError::invalid("velocityDecay", "must be within [0, 1]"));
        }

        let [min, max] = self.radius_range;
        if !(min.is_finite() && max.is_finite()) || min > max {
            return Err(ConfigError::invalid(
                "radiusRange",
                "bounds must be finite with min <= max",
            ));
        }
        if !(self.radius_exponent.is_finite() && self.radius_exponent > 0.0) {
            return Err(ConfigError::invalid(
                "radiusExponent",
                "must be finite and positive",
            ));
        }
        if !(self.value_factor.is_finite() && self.value_factor >= 0.0) {
            return Err(ConfigError::invalid(
                "valueFactor",
                "must be finite and non-negative",
            ));
        }

        // Alpha only approaches zero, so a zero threshold is never crossed.
        if !(self.alpha_min > 0.0 && self.alpha_min <= 1.0) {
            return Err(ConfigError::invalid("alphaMin", "must be within (0, 1]"));
        }
        if !in_unit_interval(self.alpha_decay) {
            return Err(ConfigError::invalid("alphaDecay", "must be within [0, 1]"));
        }
        if !in_unit_interval(self.alpha_target) {
            return Err(ConfigError::invalid("alphaTarget", "must be within [0, 1]"));
        }

        if !(self.theta.is_finite() && self.theta > 0.0) {
            return Err(ConfigError::invalid("theta", "must be finite and positive"));
        }
        if !(self.distance_min.is_finite() && self.distance_min >= 0.0) {
            return Err(ConfigError::invalid(
                "distanceMin",
                "must be finite and non-negative",
            ));
        }
        if let Some(distance_max) = self.distance_max {
            if distance_max.is_nan() || distance_max <= self.distance_min {
                return Err(ConfigError::invalid(
                    "distanceMax",
                    "must be greater than distanceMin",
                ));
            }
        }

        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        Ok(())
    }
}

fn in_unit_interval(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChartConfig::default();
        assert_eq!(config.width, 333.0);
        assert_eq!(config.height, 205.0);
        assert_eq!(config.force_strength, 0.03);
        assert_eq!(config.velocity_decay, 0.2);
        assert_eq!(config.radius_range, [2.0, 85.0]);
        assert_eq!(config.radius_exponent, 0.5);
        assert_eq!(config.radius_domain, RadiusDomain::Scaled);
        assert_eq!(config.palette.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_alpha_decay_settles_in_300_ticks() {
        let config = ChartConfig::default();
        let remaining = (1.0 - config.alpha_decay).powi(300);
        assert!(approx_eq!(f64, remaining, config.alpha_min, epsilon = 1e-12));
    }

    #[test]
    fn test_center() {
        assert_eq!(ChartConfig::default().center(), (166.5, 102.5));
    }

    #[test]
    fn test_rejects_bad_canvas() {
        let config = ChartConfig {
            width: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::invalid("width", "must be finite and positive"))
        );

        let config = ChartConfig {
            height: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_velocity_decay() {
        let config = ChartConfig {
            velocity_decay: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_radius_range() {
        let config = ChartConfig {
            radius_range: [85.0, 2.0],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_distance_max_below_min() {
        let config = ChartConfig {
            distance_min: 10.0,
            distance_max: Some(5.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_palette() {
        let config = ChartConfig {
            palette: Vec::new(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyPalette));
    }

    #[test]
    fn test_simulation_params_follow_config() {
        let config = ChartConfig {
            velocity_decay: 0.4,
            alpha_min: 0.01,
            ..Default::default()
        };
        let params = config.simulation_params();
        assert_eq!(params.velocity_decay, 0.4);
        assert_eq!(params.alpha_min, 0.01);
        assert_eq!(params.alpha_target, 0.0);
    }

    #[test]
    fn test_rejects_zero_alpha_min() {
        let config = ChartConfig {
            alpha_min: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::invalid("alphaMin", "must be within (0, 1]"))
        );
    }

    #[test]
    fn test_alpha_target_above_min_is_allowed() {
        // A warm target keeps the layout live; ticking is the caller's call.
        let config = ChartConfig {
            alpha_target: 0.3,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(!config.simulation_params().settles());
    }
}
