//! Layout preparation for bubble charts.
//!
//! This module turns raw records into the initial bubble set handed to the
//! force simulation: radii from a power scale, random starting positions,
//! and a value-descending order.

pub mod prepare;
pub mod scale;

pub use prepare::{prepare_bubbles, radius_scale};
pub use scale::PowScale;
