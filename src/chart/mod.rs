//! Bubble chart data types and the chart engine.
//!
//! Raw input records and the bubble entities produced from them. Bubbles
//! carry their value, derived radius and category, plus a position that
//! the force simulation owns while it runs. [`ChartEngine`] ties a dataset
//! to its layout run, palette and hit testing.

mod bubble;
mod engine;
mod record;

pub use bubble::{Bubble, BubbleId};
pub use engine::ChartEngine;
pub use record::Record;
