//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based spatial index for point, nearest
//! and range queries on the current bubble positions.

mod rtree;

pub use rtree::{BubbleDisk, SpatialIndex};
