//! Fixed categorical vocabularies for diamond attributes.
//!
//! Every preprocessing strategy and the encoder share these tables. They are
//! defined once, in quality order, and never change at runtime. A value
//! outside its vocabulary is a hard input error, never a silently-dropped
//! feature.

/// An ordered set of permitted values for one categorical attribute.
///
/// The order is significant twice over: it fixes the one-hot column order
/// (with index 0 as the drop-first reference), and it is the ordinal code
/// assignment for tree models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vocabulary {
    attribute: &'static str,
    values: &'static [&'static str],
}

impl Vocabulary {
    pub const fn new(attribute: &'static str, values: &'static [&'static str]) -> Self {
        Self { attribute, values }
    }

    /// Attribute name this vocabulary belongs to (e.g. `"cut"`).
    pub fn attribute(&self) -> &'static str {
        self.attribute
    }

    /// Permitted values, in vocabulary order.
    pub fn values(&self) -> &'static [&'static str] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of `value` in the vocabulary, if it is a permitted value.
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|&v| v == value)
    }
}

/// Cut quality, worst to best.
pub static CUT: Vocabulary =
    Vocabulary::new("cut", &["Fair", "Good", "Very Good", "Premium", "Ideal"]);

/// Color grade, best (colorless) to worst.
pub static COLOR: Vocabulary = Vocabulary::new("color", &["D", "E", "F", "G", "H", "I", "J"]);

/// Clarity grade, worst to best.
pub static CLARITY: Vocabulary = Vocabulary::new(
    "clarity",
    &["I1", "SI2", "SI1", "VS2", "VS1", "VVS2", "VVS1", "IF"],
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_sizes() {
        assert_eq!(CUT.len(), 5);
        assert_eq!(COLOR.len(), 7);
        assert_eq!(CLARITY.len(), 8);
    }

    #[test]
    fn index_of_known_values() {
        assert_eq!(CUT.index_of("Fair"), Some(0));
        assert_eq!(CUT.index_of("Ideal"), Some(4));
        assert_eq!(COLOR.index_of("E"), Some(1));
        assert_eq!(CLARITY.index_of("VS1"), Some(4));
    }

    #[test]
    fn index_of_unknown_value() {
        assert_eq!(CUT.index_of("Excellent"), None);
        assert_eq!(COLOR.index_of("d"), None);
    }
}
