//! Category to color assignment.
//!
//! An ordinal mapping: each distinct category, in order of first
//! appearance, takes the next color of the palette, wrapping around when
//! there are more categories than colors. The palette is an ordinary value
//! built by the caller and handed to whatever draws the bubbles.

use std::collections::HashMap;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPalette {
    colors: Vec<String>,
    domain: Vec<String>,
    index: HashMap<String, usize>,
}

impl CategoryPalette {
    /// Create a palette with an empty domain.
    pub fn new(colors: Vec<String>) -> Result<Self, ConfigError> {
        if colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(Self {
            colors,
            domain: Vec::new(),
            index: HashMap::new(),
        })
    }

    /// Create a palette whose domain is the distinct `categories`.
    pub fn from_categories<I, S>(colors: Vec<String>, categories: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut palette = Self::new(colors)?;
        for category in categories {
            palette.insert(category.as_ref());
        }
        Ok(palette)
    }

    /// Add a category to the domain if it is not already there.
    ///
    /// Returns its position in the domain.
    pub fn insert(&mut self, category: &str) -> usize {
        if let Some(&i) = self.index.get(category) {
            return i;
        }
        let i = self.domain.len();
        self.domain.push(category.to_string());
        self.index.insert(category.to_string(), i);
        i
    }

    /// Forget every category, keeping the colors.
    pub fn clear(&mut self) {
        self.domain.clear();
        self.index.clear();
    }

    /// Color for a category, or `None` if it is not in the domain.
    pub fn color(&self, category: &str) -> Option<&str> {
        self.index
            .get(category)
            .map(|&i| self.colors[i % self.colors.len()].as_str())
    }

    /// Distinct categories in first-appearance order.
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PALETTE;

    fn colors() -> Vec<String> {
        DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_first_appearance_order() {
        let palette = CategoryPalette::from_categories(
            colors(),
            ["Health", "Technology", "Health", "Travel"],
        )
        .unwrap();

        assert_eq!(palette.domain(), ["Health", "Technology", "Travel"]);
        assert_eq!(palette.color("Health"), Some("#0E1756"));
        assert_eq!(palette.color("Technology"), Some("#AABD9C"));
        assert_eq!(palette.color("Travel"), Some("#DBD3CD"));
    }

    #[test]
    fn test_colors_wrap() {
        let palette =
            CategoryPalette::from_categories(vec!["red".into(), "blue".into()], ["a", "b", "c"])
                .unwrap();
        assert_eq!(palette.color("c"), Some("red"));
    }

    #[test]
    fn test_unknown_category() {
        let palette = CategoryPalette::from_categories(colors(), ["Health"]).unwrap();
        assert_eq!(palette.color("Philosophy"), None);
    }

    #[test]
    fn test_insert_is_stable() {
        let mut palette = CategoryPalette::new(colors()).unwrap();
        assert_eq!(palette.insert("Travel"), 0);
        assert_eq!(palette.insert("Health"), 1);
        assert_eq!(palette.insert("Travel"), 0);
        assert_eq!(palette.domain().len(), 2);
    }

    #[test]
    fn test_clear_restarts_ordering() {
        let mut palette = CategoryPalette::from_categories(colors(), ["Health", "Travel"]).unwrap();
        palette.clear();
        assert_eq!(palette.color("Health"), None);
        assert_eq!(palette.insert("Travel"), 0);
        assert_eq!(palette.color("Travel"), Some("#0E1756"));
    }

    #[test]
    fn test_empty_colors_rejected() {
        assert_eq!(CategoryPalette::new(Vec::new()), Err(ConfigError::EmptyPalette));
    }
}
