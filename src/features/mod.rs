//! Canonical feature layouts.
//!
//! A [`FeatureFrame`] is the encoded form of one or more records: a fixed,
//! named, ordered set of numeric columns. The column set and ordering are
//! decided by a [`Strategy`] and are identical whether the frame holds one
//! sample (serving) or many (training) — the central correctness property of
//! the whole pipeline.
//!
//! # Storage Layout
//!
//! Values are stored feature-major: `[n_features, n_samples]`, so each
//! feature's values across all samples are contiguous. Trainers iterate
//! per-feature and rely on this.

mod strategy;

pub use strategy::Strategy;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// A named, feature-major feature matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    names: Vec<String>,
    /// `[n_features, n_samples]`.
    values: Array2<f32>,
}

impl FeatureFrame {
    /// Create a frame from feature-major data.
    ///
    /// # Panics
    ///
    /// Debug-asserts that `names` matches the number of feature rows.
    pub fn new(names: Vec<String>, values: Array2<f32>) -> Self {
        debug_assert_eq!(
            names.len(),
            values.nrows(),
            "one name per feature row required"
        );
        Self { names, values }
    }

    /// Create a single-sample frame from one encoded row.
    pub fn single(names: Vec<String>, row: Array1<f32>) -> Self {
        let n = row.len();
        let values = row
            .into_shape_with_order((n, 1))
            .expect("reshape to a single column cannot fail");
        Self::new(names, values)
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.values.nrows()
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    /// Column names, in canonical order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// All values of feature `f` across samples.
    #[inline]
    pub fn feature(&self, f: usize) -> ArrayView1<'_, f32> {
        self.values.row(f)
    }

    /// Value of feature `f` for sample `j`.
    #[inline]
    pub fn get(&self, f: usize, j: usize) -> f32 {
        self.values[[f, j]]
    }

    pub fn values(&self) -> ArrayView2<'_, f32> {
        self.values.view()
    }

    /// A new frame holding only the given samples, in the given order.
    pub fn select_samples(&self, indices: &[usize]) -> FeatureFrame {
        FeatureFrame {
            names: self.names.clone(),
            values: self.values.select(Axis(1), indices),
        }
    }
}
