//! Raw input records.

use serde::Deserialize;

use crate::error::LayoutError;

/// One `(value, category)` data point as supplied by the caller.
///
/// Deserialized straight from the JS side; a non-numeric `value` fails
/// deserialization and is reported to the caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    pub value: f64,
    pub category: String,
}

impl Record {
    pub fn new(value: f64, category: impl Into<String>) -> Self {
        Self {
            value,
            category: category.into(),
        }
    }

    /// Check that the value is a finite, non-negative number.
    ///
    /// `index` is the record's position in the input, used for reporting.
    pub fn validate(&self, index: usize) -> Result<(), LayoutError> {
        if self.value.is_finite() && self.value >= 0.0 {
            Ok(())
        } else {
            Err(LayoutError::InvalidValue {
                index,
                value: self.value,
            })
        }
    }
}
