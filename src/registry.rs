//! The model-family registry.
//!
//! A read-only, process-wide table mapping each [`ModelFamily`] to its
//! preprocessing strategy, trainer, and target-transform flag. This is the
//! single extension point: the training pipeline and the serve adapter are
//! generic over the family and only couple to it through this table.
//!
//! The family set is a closed enum rather than runtime string dispatch, so
//! exhaustiveness is checked at compile time; wire identifiers (`"linear"`,
//! `"xgboost"`) appear only at the parse boundary and in persisted artifacts.

use std::fmt;
use std::str::FromStr;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::{FeatureFrame, Strategy};
use crate::model::{GbdtParams, GbdtTrainer, LinearParams, LinearTrainer, ModelState};

/// Identifier of a model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    /// Linear regression on one-hot features, fitted on log-price.
    Linear,
    /// Gradient-boosted trees on ordinal-coded features.
    Xgboost,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 2] = [ModelFamily::Linear, ModelFamily::Xgboost];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::Linear => "linear",
            ModelFamily::Xgboost => "xgboost",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unregistered family identifier — a configuration fault, fatal to the
/// pipeline run that used it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported model family {family:?}; known families: linear, xgboost")]
pub struct UnsupportedModelError {
    pub family: String,
}

impl FromStr for ModelFamily {
    type Err = UnsupportedModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelFamily::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnsupportedModelError {
                family: s.to_string(),
            })
    }
}

/// Everything the pipeline and serve layers need to know about one family.
#[derive(Debug, Clone, Copy)]
pub struct FamilySpec {
    pub family: ModelFamily,
    pub strategy: Strategy,
    /// Whether the target is fitted in log space; predictions then require
    /// the inverse (exponential) transform.
    pub log_transform: bool,
}

impl FamilySpec {
    /// Fit this family's model on an encoded frame and aligned targets.
    ///
    /// The targets are expected already in fit space (log-transformed by the
    /// caller when `log_transform` is set).
    pub fn fit(&self, frame: &FeatureFrame, targets: ArrayView1<f32>) -> ModelState {
        match self.family {
            ModelFamily::Linear => {
                ModelState::Linear(LinearTrainer::new(LinearParams::default()).fit(frame, targets))
            }
            ModelFamily::Xgboost => {
                ModelState::Boosted(GbdtTrainer::new(GbdtParams::default()).fit(frame, targets))
            }
        }
    }
}

static REGISTRY: [FamilySpec; 2] = [
    FamilySpec {
        family: ModelFamily::Linear,
        strategy: Strategy::Linear,
        log_transform: true,
    },
    FamilySpec {
        family: ModelFamily::Xgboost,
        strategy: Strategy::Ordinal,
        log_transform: false,
    },
];

/// The full registry table.
pub fn registry() -> &'static [FamilySpec] {
    &REGISTRY
}

/// The spec for a family. Total: every enum variant has an entry.
pub fn spec_for(family: ModelFamily) -> &'static FamilySpec {
    match family {
        ModelFamily::Linear => &REGISTRY[0],
        ModelFamily::Xgboost => &REGISTRY[1],
    }
}
