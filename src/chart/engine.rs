//! ChartEngine - the bubble chart behind the JS facade.
//!
//! The ChartEngine ties the pieces of one chart together:
//! - Configuration, validated once at construction
//! - Layout preparation (records → sized, placed, sorted bubbles)
//! - The force simulation driving the current dataset
//! - The category palette built from the current dataset
//! - A spatial index over the latest positions for hit testing
//!
//! It holds no JS types, so the full pipeline is testable natively.

use log::{debug, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{Bubble, BubbleId, Record};
use crate::config::ChartConfig;
use crate::error::ChartError;
use crate::layout::prepare_bubbles;
use crate::palette::CategoryPalette;
use crate::simulation::{ForceSet, Simulation, SimulationStatus, Snapshot};
use crate::spatial::SpatialIndex;

/// RNG stream used for charge jiggle; placement uses the default stream.
const JIGGLE_STREAM: u64 = 1;

/// One bubble chart: configuration, current dataset and its layout run.
#[derive(Debug)]
pub struct ChartEngine {
    config: ChartConfig,

    /// Source of initial positions
    placement_rng: ChaCha8Rng,

    simulation: Simulation<ChaCha8Rng>,

    /// Category colors for the current dataset
    palette: CategoryPalette,

    /// Spatial index for hit testing
    spatial: SpatialIndex,

    /// Whether positions moved since the spatial index was built
    spatial_dirty: bool,
}

impl ChartEngine {
    /// Create an empty chart.
    ///
    /// `fallback_seed` seeds the RNG when `config.seed` is absent.
    pub fn new(config: ChartConfig, fallback_seed: u64) -> Result<Self, ChartError> {
        config.validate()?;

        let seed = config.seed.unwrap_or(fallback_seed);
        let placement_rng = ChaCha8Rng::seed_from_u64(seed);
        let mut jiggle_rng = ChaCha8Rng::seed_from_u64(seed);
        jiggle_rng.set_stream(JIGGLE_STREAM);

        let simulation = Simulation::new(
            config.simulation_params(),
            ForceSet::bubble_chart(&config),
            jiggle_rng,
        );
        let palette = CategoryPalette::new(config.palette.clone())?;

        Ok(Self {
            config,
            placement_rng,
            simulation,
            palette,
            spatial: SpatialIndex::new(),
            spatial_dirty: false,
        })
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Replace the dataset and start a fresh layout run.
    ///
    /// Returns the generation of the new run. On error the previous run
    /// and palette are left as they were.
    pub fn set_data(&mut self, records: &[Record]) -> Result<u64, ChartError> {
        let bubbles = prepare_bubbles(records, &self.config, &mut self.placement_rng)
            .inspect_err(|err| warn!(error:% = err; "Rejected chart data"))?;

        let palette = CategoryPalette::from_categories(
            self.config.palette.clone(),
            records.iter().map(|r| r.category.as_str()),
        )?;

        let generation = self.simulation.start(bubbles)?;
        self.palette = palette;
        self.spatial_dirty = true;

        debug!(
            generation = generation,
            categories = self.palette.domain().len();
            "Chart data replaced"
        );
        Ok(generation)
    }

    /// Drop the dataset and go idle.
    pub fn clear(&mut self) {
        self.simulation.clear();
        self.palette.clear();
        self.spatial.clear();
        self.spatial_dirty = false;
    }

    // =========================================================================
    // Simulation control
    // =========================================================================

    /// Advance the layout by one tick.
    ///
    /// Returns false once the run has settled or been stopped.
    pub fn tick(&mut self) -> bool {
        let ticked = self.simulation.tick().is_some();
        if ticked {
            self.spatial_dirty = true;
        }
        ticked
    }

    /// Advance one tick only if `generation` is still the current run.
    ///
    /// Animation loops pass the generation they were started for; once a
    /// newer dataset replaces it this returns false and the loop can end.
    pub fn tick_for(&mut self, generation: u64) -> bool {
        generation == self.simulation.generation() && self.tick()
    }

    /// Tick until the run settles or is stopped. Returns the ticks taken.
    ///
    /// Returns 0 for runs whose parameters never settle.
    pub fn run(&mut self) -> u64 {
        let ticks = self.simulation.run(|_| {});
        if ticks > 0 {
            self.spatial_dirty = true;
        }
        ticks
    }

    pub fn stop(&mut self) {
        self.simulation.stop();
    }

    pub fn restart(&mut self) {
        self.simulation.restart();
    }

    pub fn status(&self) -> SimulationStatus {
        self.simulation.status()
    }

    pub fn is_running(&self) -> bool {
        self.simulation.is_running()
    }

    pub fn alpha(&self) -> f64 {
        self.simulation.alpha()
    }

    pub fn generation(&self) -> u64 {
        self.simulation.generation()
    }

    pub fn tick_count(&self) -> u64 {
        self.simulation.tick_count()
    }

    // =========================================================================
    // Bubbles
    // =========================================================================

    /// Current bubbles, largest first.
    pub fn bubbles(&self) -> &[Bubble] {
        self.simulation.bubbles()
    }

    pub fn bubble(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles().get(id.index())
    }

    pub fn bubble_count(&self) -> usize {
        self.bubbles().len()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.simulation.snapshot()
    }

    /// X positions in bubble order, for renderer upload.
    pub fn positions_x(&self) -> Vec<f32> {
        self.bubbles().iter().map(|b| b.x() as f32).collect()
    }

    /// Y positions in bubble order, for renderer upload.
    pub fn positions_y(&self) -> Vec<f32> {
        self.bubbles().iter().map(|b| b.y() as f32).collect()
    }

    pub fn radii(&self) -> Vec<f32> {
        self.bubbles().iter().map(|b| b.radius() as f32).collect()
    }

    /// Fill color of a bubble, from its category.
    pub fn color_of(&self, id: BubbleId) -> Option<&str> {
        self.bubble(id)
            .and_then(|bubble| self.palette.color(bubble.category()))
    }

    pub fn label(&self, id: BubbleId) -> Option<String> {
        self.bubble(id).map(Bubble::label)
    }

    pub fn palette(&self) -> &CategoryPalette {
        &self.palette
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Topmost bubble containing a point.
    pub fn bubble_at(&mut self, x: f64, y: f64) -> Option<BubbleId> {
        self.ensure_spatial_index_up_to_date();
        self.spatial.bubble_at(x, y)
    }

    /// Bubble whose edge is closest to a point.
    pub fn nearest(&mut self, x: f64, y: f64) -> Option<BubbleId> {
        self.ensure_spatial_index_up_to_date();
        self.spatial.nearest(x, y)
    }

    /// Nearest bubble whose edge is within `max_distance` of a point.
    pub fn nearest_within(&mut self, x: f64, y: f64, max_distance: f64) -> Option<BubbleId> {
        self.ensure_spatial_index_up_to_date();
        self.spatial.nearest_within(x, y, max_distance)
    }

    /// Bubbles whose bounding boxes intersect a rectangle, in index order.
    pub fn bubbles_in_rect(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<BubbleId> {
        self.ensure_spatial_index_up_to_date();
        let mut ids = self.spatial.in_rect(min_x, min_y, max_x, max_y);
        ids.sort_unstable();
        ids
    }

    fn ensure_spatial_index_up_to_date(&mut self) {
        if self.spatial_dirty {
            self.spatial.rebuild(self.simulation.bubbles());
            self.spatial_dirty = false;
        }
    }
}
