//! The raw diamond observation.

use serde::{Deserialize, Serialize};

/// One diamond observation, as loaded from the reference CSV or received in a
/// prediction request.
///
/// `price` is the regression target. It is present in training data and
/// absent (or ignored) at serving time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Weight in carats.
    pub carat: f32,
    pub cut: String,
    pub color: String,
    pub clarity: String,
    /// Total depth percentage.
    pub depth: f32,
    /// Table width as a percentage of the widest point.
    pub table: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f32>,
    /// Length in mm.
    pub x: f32,
    /// Width in mm.
    pub y: f32,
    /// Depth in mm.
    pub z: f32,
}

impl Record {
    /// The training target for this record, if it passes the data-quality
    /// filter: physical volume must be non-zero and the price strictly
    /// positive. Returns `None` for rows that must be excluded from training.
    ///
    /// The filter is a training-time concern only; serving-time records have
    /// no price and are never filtered.
    pub fn training_target(&self) -> Option<f32> {
        if self.x * self.y * self.z == 0.0 {
            return None;
        }
        self.price.filter(|&p| p > 0.0)
    }
}
