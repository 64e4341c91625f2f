//! Deterministic categorical encoding.
//!
//! Two encodings over the fixed vocabularies:
//!
//! - One-hot indicator columns named `"{attribute}_{value}"`, optionally
//!   dropping the first vocabulary entry as the reference category.
//! - Ordinal codes (the vocabulary index as a float) for tree models.
//!
//! # Layout Consistency
//!
//! [`one_hot_fill`] always zeroes the full column template before setting the
//! matching indicator. Single records and batches therefore go through the
//! same code path and produce byte-identical layouts; a batch that happens to
//! miss a rare category can never silently drop that category's column.

use thiserror::Error;

use super::vocab::Vocabulary;

/// Input validation failures raised while encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A category value not present in its vocabulary.
    #[error("unknown {attribute} value {value:?}")]
    UnknownCategory {
        attribute: &'static str,
        value: String,
    },
}

/// Number of indicator columns produced for `vocab`.
pub fn one_hot_width(vocab: &Vocabulary, drop_first: bool) -> usize {
    vocab.len() - usize::from(drop_first)
}

/// Indicator column names for `vocab`, in vocabulary order.
///
/// With `drop_first`, the first vocabulary entry is the reference category
/// and gets no column.
pub fn one_hot_columns(vocab: &Vocabulary, drop_first: bool) -> Vec<String> {
    vocab
        .values()
        .iter()
        .skip(usize::from(drop_first))
        .map(|v| format!("{}_{}", vocab.attribute(), v))
        .collect()
}

/// Write the one-hot encoding of `value` into `out`.
///
/// `out` must span the full column template ([`one_hot_width`] entries). It is
/// zeroed first, then the indicator for `value` is set; the dropped reference
/// category encodes as all zeros.
///
/// # Errors
///
/// [`ValidationError::UnknownCategory`] if `value` is not in the vocabulary.
pub fn one_hot_fill(
    vocab: &Vocabulary,
    value: &str,
    drop_first: bool,
    out: &mut [f32],
) -> Result<(), ValidationError> {
    debug_assert_eq!(out.len(), one_hot_width(vocab, drop_first));
    out.fill(0.0);

    let idx = vocab
        .index_of(value)
        .ok_or_else(|| ValidationError::UnknownCategory {
            attribute: vocab.attribute(),
            value: value.to_string(),
        })?;

    let skip = usize::from(drop_first);
    if idx >= skip {
        out[idx - skip] = 1.0;
    }
    Ok(())
}

/// Ordinal code of `value`: its vocabulary index as a float.
pub fn ordinal_code(vocab: &Vocabulary, value: &str) -> Result<f32, ValidationError> {
    vocab
        .index_of(value)
        .map(|idx| idx as f32)
        .ok_or_else(|| ValidationError::UnknownCategory {
            attribute: vocab.attribute(),
            value: value.to_string(),
        })
}
