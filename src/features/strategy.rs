//! Per-family preprocessing strategies.
//!
//! Each model family owns exactly one strategy. Both strategies encode every
//! row against the full column template, so single-record (serving) and batch
//! (training) paths cannot diverge in column set or order.

use ndarray::{Array1, Array2, ArrayView1};

use crate::data::encode::{one_hot_columns, one_hot_fill, one_hot_width, ordinal_code};
use crate::data::vocab::{CLARITY, COLOR, CUT};
use crate::data::{Record, ValidationError};

use super::FeatureFrame;

/// A preprocessing strategy: raw records in, canonical feature layout out.
///
/// Closed set; adding a model family means adding a variant here and a
/// registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// For the linear family: keeps `carat` and `x` only (depth, table, y and
    /// z are dropped for multicollinearity), one-hot encodes cut/color/clarity
    /// with the first vocabulary entry as the dropped reference.
    Linear,
    /// For the gradient-boosting family: keeps every numeric column and
    /// represents cut/color/clarity as ordinal codes over their fixed
    /// vocabularies. Trees partition directly on the codes.
    Ordinal,
}

impl Strategy {
    /// The fixed column layout this strategy always produces.
    pub fn canonical_columns(&self) -> Vec<String> {
        match self {
            Strategy::Linear => {
                let mut cols = vec!["carat".to_string(), "x".to_string()];
                cols.extend(one_hot_columns(&CUT, true));
                cols.extend(one_hot_columns(&COLOR, true));
                cols.extend(one_hot_columns(&CLARITY, true));
                cols
            }
            Strategy::Ordinal => [
                "carat", "cut", "color", "clarity", "depth", "table", "x", "y", "z",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    /// Number of columns in the canonical layout.
    pub fn n_columns(&self) -> usize {
        match self {
            Strategy::Linear => {
                2 + one_hot_width(&CUT, true)
                    + one_hot_width(&COLOR, true)
                    + one_hot_width(&CLARITY, true)
            }
            Strategy::Ordinal => 9,
        }
    }

    /// Encode one record into `buf` (cleared first), in canonical column
    /// order. The full one-hot template is materialized regardless of which
    /// categories the record carries.
    fn encode_row(&self, record: &Record, buf: &mut Vec<f32>) -> Result<(), ValidationError> {
        buf.clear();
        match self {
            Strategy::Linear => {
                buf.push(record.carat);
                buf.push(record.x);
                for (vocab, value) in [
                    (&CUT, record.cut.as_str()),
                    (&COLOR, record.color.as_str()),
                    (&CLARITY, record.clarity.as_str()),
                ] {
                    let start = buf.len();
                    buf.resize(start + one_hot_width(vocab, true), 0.0);
                    one_hot_fill(vocab, value, true, &mut buf[start..])?;
                }
            }
            Strategy::Ordinal => {
                buf.push(record.carat);
                buf.push(ordinal_code(&CUT, &record.cut)?);
                buf.push(ordinal_code(&COLOR, &record.color)?);
                buf.push(ordinal_code(&CLARITY, &record.clarity)?);
                buf.push(record.depth);
                buf.push(record.table);
                buf.push(record.x);
                buf.push(record.y);
                buf.push(record.z);
            }
        }
        debug_assert_eq!(buf.len(), self.n_columns());
        Ok(())
    }

    /// Encode a single serving-time record. The price field is ignored and
    /// the training-time quality filter does not apply.
    pub fn preprocess_record(&self, record: &Record) -> Result<Array1<f32>, ValidationError> {
        let mut buf = Vec::with_capacity(self.n_columns());
        self.encode_row(record, &mut buf)?;
        Ok(Array1::from_vec(buf))
    }

    /// Encode a training batch.
    ///
    /// Rows with zero physical volume or a non-positive price are dropped
    /// before encoding. Returns the feature frame and the aligned price
    /// targets for the surviving rows.
    pub fn preprocess_training(
        &self,
        records: &[Record],
    ) -> Result<(FeatureFrame, Array1<f32>), ValidationError> {
        let kept: Vec<(&Record, f32)> = records
            .iter()
            .filter_map(|r| r.training_target().map(|t| (r, t)))
            .collect();

        let n_cols = self.n_columns();
        let mut values = Array2::zeros((n_cols, kept.len()));
        let mut targets = Array1::zeros(kept.len());
        let mut buf = Vec::with_capacity(n_cols);

        for (j, (record, target)) in kept.iter().enumerate() {
            self.encode_row(record, &mut buf)?;
            values.column_mut(j).assign(&ArrayView1::from(&buf[..]));
            targets[j] = *target;
        }

        Ok((FeatureFrame::new(self.canonical_columns(), values), targets))
    }
}
