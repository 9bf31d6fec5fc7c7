//! Bubble entity and its stable index.
//!
//! A bubble is one positioned, sized circle representing one data record.
//! Each bubble has:
//! - The source value and its opaque category label
//! - A radius derived from the value, fixed at creation
//! - A position (x, y) that the force simulation mutates every tick

use std::fmt;

use serde::Serialize;

/// Position of a bubble in the prepared (value-descending) sequence.
///
/// The sequence order never changes during a simulation run, so the index
/// stays valid for as long as the dataset does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BubbleId(pub u32);

impl BubbleId {
    /// Create a new BubbleId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the id as a sequence index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BubbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bubble({})", self.0)
    }
}

impl From<u32> for BubbleId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<BubbleId> for u32 {
    #[inline]
    fn from(id: BubbleId) -> Self {
        id.0
    }
}

/// A sized, positioned circle.
///
/// `value`, `radius` and `category` are fixed once the bubble exists; only
/// the simulation moves it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bubble {
    value: f64,
    radius: f64,
    category: String,
    x: f64,
    y: f64,
}

impl Bubble {
    /// Create a bubble at the given position.
    pub fn new(value: f64, radius: f64, category: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            value,
            radius,
            category: category.into(),
            x,
            y,
        }
    }

    /// The source quantity.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Label used for color lookup. Opaque to the layout.
    #[inline]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Current position as `(x, y)`.
    #[inline]
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    #[inline]
    pub(crate) fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Check that radius and position are all finite.
    pub fn is_finite(&self) -> bool {
        self.radius.is_finite() && self.x.is_finite() && self.y.is_finite()
    }

    /// Check whether a point lies inside (or on) the bubble's disk.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    /// Label text drawn on the bubble, e.g. `"50%"`.
    pub fn label(&self) -> String {
        format!("{}%", self.value)
    }
}
