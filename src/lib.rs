//! Bubble Chart - WASM Module
//!
//! This module provides the force-directed layout engine for bubble
//! charts. It is compiled to WebAssembly and exposes a JavaScript-friendly
//! API via wasm-bindgen; the engine modules beneath it are plain Rust.
//!
//! # Architecture
//!
//! - `chart`: Bubble and record types, and the `ChartEngine` behind the facade
//! - `layout`: Radius scale and initial bubble preparation
//! - `simulation`: Tick-driven force simulation (centering + Barnes-Hut charge)
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing
//! - `palette`: Category to color assignment
//! - `config`, `error`, `logging`: Options, error types and console logging

use js_sys::Float32Array;
use log::LevelFilter;
use wasm_bindgen::prelude::*;

pub mod chart;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod palette;
pub mod simulation;
pub mod spatial;

use chart::{BubbleId, ChartEngine, Record};
use config::ChartConfig;
use error::ChartError;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::init(level);
}

/// Main entry point for the bubble chart.
///
/// This struct wraps the internal ChartEngine and provides the public API
/// exposed to JavaScript.
#[wasm_bindgen]
pub struct BubbleChartWasm {
    engine: ChartEngine,
}

#[wasm_bindgen]
impl BubbleChartWasm {
    /// Create a chart.
    ///
    /// `config` is an optional, possibly partial, options object with
    /// camelCase keys. Throws if an option is out of range.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<BubbleChartWasm, JsError> {
        let config = if config.is_undefined() || config.is_null() {
            ChartConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(ChartError::from)?
        };

        // 53 bits is all Math.random() carries.
        let entropy = (js_sys::Math::random() * (1u64 << 53) as f64) as u64;

        Ok(Self {
            engine: ChartEngine::new(config, entropy)?,
        })
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Replace the dataset with `[{ value, category }, ...]` and start a new
    /// layout run.
    ///
    /// Returns the run's generation. Throws on a non-numeric, negative or
    /// non-finite value, leaving the current run in place.
    #[wasm_bindgen(js_name = setData)]
    pub fn set_data(&mut self, records: JsValue) -> Result<f64, JsError> {
        let records: Vec<Record> =
            serde_wasm_bindgen::from_value(records).map_err(ChartError::from)?;
        let generation = self.engine.set_data(&records)?;
        Ok(generation as f64)
    }

    /// Drop the dataset.
    pub fn clear(&mut self) {
        self.engine.clear();
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance one tick. Returns false once settled or stopped.
    pub fn tick(&mut self) -> bool {
        self.engine.tick()
    }

    /// Advance one tick if `generation` is still the current run.
    ///
    /// Returns false when a newer `setData` replaced that run, so an
    /// animation loop can end itself.
    #[wasm_bindgen(js_name = tickFor)]
    pub fn tick_for(&mut self, generation: f64) -> bool {
        self.engine.tick_for(generation as u64)
    }

    /// Tick until settled or stopped. Returns the number of ticks.
    ///
    /// Returns 0 without ticking when `alphaTarget >= alphaMin` or
    /// `alphaDecay` is 0, since such a run never settles; drive it with
    /// `tick` from an animation loop instead.
    #[wasm_bindgen(js_name = runToEnd)]
    pub fn run_to_end(&mut self) -> f64 {
        self.engine.run() as f64
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    /// Reheat and resume from the current positions.
    pub fn restart(&mut self) {
        self.engine.restart();
    }

    pub fn alpha(&self) -> f64 {
        self.engine.alpha()
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn generation(&self) -> f64 {
        self.engine.generation() as f64
    }

    // =========================================================================
    // Bubbles
    // =========================================================================

    /// Current bubbles as `[{ value, radius, category, x, y }, ...]`,
    /// largest first.
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(self.engine.bubbles()).map_err(ChartError::from)?)
    }

    #[wasm_bindgen(js_name = bubbleCount)]
    pub fn bubble_count(&self) -> u32 {
        self.engine.bubble_count() as u32
    }

    /// X positions in bubble order.
    #[wasm_bindgen(js_name = positionsX)]
    pub fn positions_x(&self) -> Float32Array {
        Float32Array::from(self.engine.positions_x().as_slice())
    }

    /// Y positions in bubble order.
    #[wasm_bindgen(js_name = positionsY)]
    pub fn positions_y(&self) -> Float32Array {
        Float32Array::from(self.engine.positions_y().as_slice())
    }

    pub fn radii(&self) -> Float32Array {
        Float32Array::from(self.engine.radii().as_slice())
    }

    /// Fill color for the bubble at `index`.
    #[wasm_bindgen(js_name = colorOf)]
    pub fn color_of(&self, index: u32) -> Option<String> {
        self.engine.color_of(BubbleId(index)).map(str::to_string)
    }

    /// Label text for the bubble at `index`, e.g. `"50%"`.
    pub fn label(&self, index: u32) -> Option<String> {
        self.engine.label(BubbleId(index))
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Index of the topmost bubble under a point.
    #[wasm_bindgen(js_name = bubbleAt)]
    pub fn bubble_at(&mut self, x: f64, y: f64) -> Option<u32> {
        self.engine.bubble_at(x, y).map(|id| id.0)
    }

    /// Index of the bubble whose edge is closest to a point.
    pub fn nearest(&mut self, x: f64, y: f64) -> Option<u32> {
        self.engine.nearest(x, y).map(|id| id.0)
    }

    /// Nearest bubble whose edge is within `max_distance` of a point.
    #[wasm_bindgen(js_name = nearestWithin)]
    pub fn nearest_within(&mut self, x: f64, y: f64, max_distance: f64) -> Option<u32> {
        self.engine.nearest_within(x, y, max_distance).map(|id| id.0)
    }

    /// Indices of bubbles intersecting a rectangle.
    ///
    /// Returns a Uint32Array of bubble indices.
    #[wasm_bindgen(js_name = bubblesInRect)]
    pub fn bubbles_in_rect(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<u32> {
        self.engine
            .bubbles_in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(u32::from)
            .collect()
    }

    pub fn width(&self) -> f64 {
        self.engine.config().width
    }

    pub fn height(&self) -> f64 {
        self.engine.config().height
    }
}
