//! Power-law scale for sizing bubbles.
//!
//! Maps a continuous domain `[d0, d1]` to a range `[r0, r1]` through
//! `x -> sign(x) * |x|^exponent`, interpolating linearly between the
//! transformed domain bounds. With exponent 0.5 a bubble's area, rather
//! than its radius, grows linearly with its value.

/// A monotonic power scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowScale {
    exponent: f64,
    domain: [f64; 2],
    range: [f64; 2],
    clamp: bool,
}

impl Default for PowScale {
    fn default() -> Self {
        Self {
            exponent: 1.0,
            domain: [0.0, 1.0],
            range: [0.0, 1.0],
            clamp: false,
        }
    }
}

impl PowScale {
    pub fn new(exponent: f64, domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            exponent,
            domain,
            range,
            clamp: false,
        }
    }

    /// Square-root scale (exponent 0.5).
    pub fn sqrt(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self::new(0.5, domain, range)
    }

    /// Restrict outputs to the range bounds.
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    /// Whether the transformed domain has zero width.
    ///
    /// A degenerate scale maps every input to the range start.
    pub fn is_degenerate(&self) -> bool {
        let span = self.transform(self.domain[1]) - self.transform(self.domain[0]);
        span == 0.0 || !span.is_finite()
    }

    /// Map a domain value into the range.
    pub fn scale(&self, x: f64) -> f64 {
        let [r0, r1] = self.range;
        let t0 = self.transform(self.domain[0]);
        let span = self.transform(self.domain[1]) - t0;
        if span == 0.0 || !span.is_finite() {
            return r0;
        }

        let mut t = (self.transform(x) - t0) / span;
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        r0 + (r1 - r0) * t
    }

    fn transform(&self, x: f64) -> f64 {
        if x < 0.0 {
            -(-x).powf(self.exponent)
        } else {
            x.powf(self.exponent)
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn test_linear_default() {
        let scale = PowScale::default();
        assert_eq!(scale.scale(0.0), 0.0);
        assert_eq!(scale.scale(0.5), 0.5);
        assert_eq!(scale.scale(1.0), 1.0);
    }

    #[test]
    fn test_sqrt_endpoints() {
        let scale = PowScale::sqrt([0.0, 20.0], [2.0, 85.0]);
        assert_eq!(scale.scale(0.0), 2.0);
        assert_eq!(scale.scale(20.0), 85.0);
    }

    #[test]
    fn test_sqrt_midpoint() {
        let scale = PowScale::sqrt([0.0, 100.0], [0.0, 10.0]);
        // sqrt(25) / sqrt(100) = 0.5
        assert!(approx_eq!(f64, scale.scale(25.0), 5.0, ulps = 4));
    }

    #[test]
    fn test_degenerate_domain_maps_to_range_start() {
        let scale = PowScale::sqrt([0.0, 0.0], [2.0, 85.0]);
        assert!(scale.is_degenerate());
        assert_eq!(scale.scale(0.0), 2.0);
        assert_eq!(scale.scale(10.0), 2.0);
    }

    #[test]
    fn test_negative_inputs_mirror() {
        let scale = PowScale::sqrt([-4.0, 4.0], [-1.0, 1.0]);
        assert!(approx_eq!(f64, scale.scale(-4.0), -1.0, ulps = 4));
        assert!(approx_eq!(f64, scale.scale(0.0), 0.0, ulps = 4));
    }

    #[test]
    fn test_clamp() {
        let scale = PowScale::sqrt([0.0, 4.0], [0.0, 10.0]);
        assert!(scale.scale(16.0) > 10.0);

        let clamped = scale.with_clamp(true);
        assert_eq!(clamped.scale(16.0), 10.0);
        assert_eq!(clamped.scale(-1.0), 0.0);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn scale_is_monotonic(max in 0.001f64..1.0e6, a in 0.0f64..1.0, b in 0.0f64..1.0) {
            let scale = PowScale::sqrt([0.0, max], [2.0, 85.0]);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(scale.scale(lo * max) <= scale.scale(hi * max));
        }

        #[test]
        fn scale_stays_in_range(max in 0.001f64..1.0e6, t in 0.0f64..=1.0) {
            let scale = PowScale::sqrt([0.0, max], [2.0, 85.0]);
            let r = scale.scale(t * max);
            prop_assert!((2.0..=85.0).contains(&r));
        }
    }
}
