//! Error types for bubble chart operations.
//!
//! [`ChartError`] is what the JS facade surfaces; it wraps the narrower
//! errors raised while validating configuration and preparing layouts.

use thiserror::Error;

/// Errors raised while turning records into bubbles or starting a simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("record {index} has invalid value {value}: values must be finite and non-negative")]
    InvalidValue { index: usize, value: f64 },

    #[error("bubble {index} has a non-finite radius or position")]
    NonFiniteBubble { index: usize },
}

/// Errors raised by [`ChartConfig::validate`](crate::config::ChartConfig::validate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },

    #[error("palette must contain at least one color")]
    EmptyPalette,
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}

/// The main error type for the chart facade.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

impl From<serde_wasm_bindgen::Error> for ChartError {
    fn from(error: serde_wasm_bindgen::Error) -> Self {
        Self::Deserialize(error.to_string())
    }
}
