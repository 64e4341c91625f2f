//! Model-fitting capabilities.
//!
//! The pipeline and serve layers treat models as opaque: a family trainer
//! turns a feature frame and targets into a [`ModelState`], and
//! [`ModelState::predict`] turns a frame back into values. Everything else
//! about the fitting algorithms is private to this module.

pub mod gbdt;
pub mod linear;

pub use gbdt::{Forest, GbdtParams, GbdtTrainer, Tree};
pub use linear::{LinearModel, LinearParams, LinearTrainer};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::features::FeatureFrame;

/// Fitted model state for any family, serializable as part of an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelState {
    Linear(LinearModel),
    Boosted(Forest),
}

impl ModelState {
    /// Predict one raw value per sample. Any target transform inverse (e.g.
    /// exponentiation for log-trained families) is the caller's concern.
    pub fn predict(&self, frame: &FeatureFrame) -> Array1<f32> {
        match self {
            ModelState::Linear(m) => m.predict(frame),
            ModelState::Boosted(m) => m.predict(frame),
        }
    }

    /// Number of canonical feature columns this model was fitted on.
    pub fn n_features(&self) -> usize {
        match self {
            ModelState::Linear(m) => m.n_features(),
            ModelState::Boosted(m) => m.n_features,
        }
    }
}
