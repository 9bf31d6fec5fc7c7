//! Turn raw records into the initial bubble set.
//!
//! Each record becomes one bubble whose radius comes from a square-root
//! scale over the dataset's value range and whose position is drawn
//! uniformly at random within the canvas. Bubbles are returned largest
//! first, so large bubbles settle before small ones can stack over them.

use log::debug;
use rand::Rng;

use super::scale::PowScale;
use crate::chart::{Bubble, Record};
use crate::config::{ChartConfig, RadiusDomain};
use crate::error::LayoutError;

/// Build the radius scale for a dataset.
///
/// The domain runs from zero to the dataset maximum, multiplied by
/// `value_factor` unless the config asks for [`RadiusDomain::MaxValue`].
/// Returns `None` for an empty dataset.
pub fn radius_scale(records: &[Record], config: &ChartConfig) -> Option<PowScale> {
    let max_value = records.iter().map(|r| r.value).reduce(f64::max)?;
    let upper = match config.radius_domain {
        RadiusDomain::Scaled => max_value * config.value_factor,
        RadiusDomain::MaxValue => max_value,
    };

    Some(
        PowScale::new(config.radius_exponent, [0.0, upper], config.radius_range)
            .with_clamp(true),
    )
}

/// Prepare bubbles from records.
///
/// # Arguments
///
/// * `records` - Raw `(value, category)` data in input order
/// * `config` - Canvas size and radius sizing options
/// * `rng` - Source for initial positions
///
/// # Returns
///
/// One bubble per record, sorted by value descending. Empty input yields an
/// empty vec. Negative or non-finite values are rejected.
pub fn prepare_bubbles<R: Rng + ?Sized>(
    records: &[Record],
    config: &ChartConfig,
    rng: &mut R,
) -> Result<Vec<Bubble>, LayoutError> {
    for (index, record) in records.iter().enumerate() {
        record.validate(index)?;
    }

    let Some(scale) = radius_scale(records, config) else {
        return Ok(Vec::new());
    };

    let mut bubbles: Vec<Bubble> = records
        .iter()
        .map(|record| {
            let radius = scale.scale(record.value * config.value_factor);
            let x = rng.r#gen::<f64>() * config.width;
            let y = rng.r#gen::<f64>() * config.height;
            Bubble::new(record.value, radius, record.category.clone(), x, y)
        })
        .collect();

    bubbles.sort_by(|a, b| b.value().total_cmp(&a.value()));

    debug!(
        count = bubbles.len(),
        max_value = scale.domain()[1];
        "Prepared bubbles"
    );

    Ok(bubbles)
}


#[cfg(all(test, not(target_arch = "wasm32")))]
mod proptests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn records_strategy() -> impl Strategy<Value = Vec<Record>> {
        prop::collection::vec((0.0f64..1000.0, "[A-Z][a-z]{2,8}"), 1..40)
            .prop_map(|pairs| pairs.into_iter().map(|(v, c)| Record::new(v, c)).collect())
    }

    proptest! {
        #[test]
        fn bubbles_sorted_descending(records in records_strategy(), seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let bubbles = prepare_bubbles(&records, &ChartConfig::default(), &mut rng).unwrap();
            prop_assert_eq!(bubbles.len(), records.len());
            for pair in bubbles.windows(2) {
                prop_assert!(pair[0].value() >= pair[1].value());
            }
        }

        #[test]
        fn radius_monotonic_and_bounded(records in records_strategy(), seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let bubbles = prepare_bubbles(&records, &ChartConfig::default(), &mut rng).unwrap();
            for bubble in &bubbles {
                prop_assert!((2.0..=85.0).contains(&bubble.radius()));
            }
            for pair in bubbles.windows(2) {
                prop_assert!(pair[0].radius() >= pair[1].radius());
            }
        }
    }
}
