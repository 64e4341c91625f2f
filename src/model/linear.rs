//! Linear regression via cyclic coordinate descent.
//!
//! Squared-loss, single-output specialization of gradient-boosted linear
//! training: each round takes a Newton step per coordinate
//! (`delta = -(sum_grad + lambda * w) / (sum_hess + lambda)`, scaled by the
//! learning rate) and refreshes the running prediction vector, with the bias
//! updated from the mean residual. For squared loss the per-sample hessian is
//! 1, so `sum_hess` reduces to the squared feature norm.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::features::FeatureFrame;

/// Fitted linear model state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// One weight per canonical feature column.
    pub weights: Vec<f32>,
    pub bias: f32,
}

impl LinearModel {
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// Predict one value per sample in `frame`.
    pub fn predict(&self, frame: &FeatureFrame) -> Array1<f32> {
        debug_assert_eq!(frame.n_features(), self.n_features());
        let mut preds = Array1::from_elem(frame.n_samples(), self.bias);
        for (f, &w) in self.weights.iter().enumerate() {
            if w == 0.0 {
                continue;
            }
            preds.zip_mut_with(&frame.feature(f), |p, &v| *p += w * v);
        }
        preds
    }
}

/// Coordinate descent parameters.
#[derive(Debug, Clone)]
pub struct LinearParams {
    /// Number of full coordinate sweeps.
    pub n_rounds: u32,
    /// Step size applied to each Newton step.
    pub learning_rate: f32,
    /// L2 regularization (lambda).
    pub lambda: f32,
}

impl Default for LinearParams {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.5,
            lambda: 1.0,
        }
    }
}

/// Trainer for [`LinearModel`].
#[derive(Debug, Clone, Default)]
pub struct LinearTrainer {
    params: LinearParams,
}

impl LinearTrainer {
    pub fn new(params: LinearParams) -> Self {
        Self { params }
    }

    /// Fit on a feature frame and aligned targets.
    ///
    /// Deterministic: cyclic coordinate order, no sampling.
    pub fn fit(&self, frame: &FeatureFrame, targets: ArrayView1<f32>) -> LinearModel {
        let n_samples = frame.n_samples();
        let n_features = frame.n_features();
        debug_assert_eq!(targets.len(), n_samples);

        let mean = targets.iter().map(|&y| y as f64).sum::<f64>() / n_samples.max(1) as f64;
        let mut bias = mean as f32;
        let mut weights = vec![0.0f32; n_features];
        let mut preds: Vec<f32> = vec![bias; n_samples];

        for round in 0..self.params.n_rounds {
            // Bias step: mean residual, hessian = n.
            let sum_grad: f64 = preds
                .iter()
                .zip(targets.iter())
                .map(|(&p, &y)| (p - y) as f64)
                .sum();
            let bias_delta = (-self.params.learning_rate as f64 * sum_grad
                / n_samples.max(1) as f64) as f32;
            bias += bias_delta;
            for p in &mut preds {
                *p += bias_delta;
            }

            for f in 0..n_features {
                let col = frame.feature(f);
                let mut sum_grad = 0.0f64;
                let mut sum_hess = 0.0f64;
                for ((&x, &p), &y) in col.iter().zip(preds.iter()).zip(targets.iter()) {
                    sum_grad += (x * (p - y)) as f64;
                    sum_hess += (x * x) as f64;
                }

                let denom = sum_hess + self.params.lambda as f64;
                if denom <= 0.0 {
                    continue;
                }
                let delta = (-self.params.learning_rate as f64
                    * (sum_grad + self.params.lambda as f64 * weights[f] as f64)
                    / denom) as f32;
                if delta == 0.0 {
                    continue;
                }
                weights[f] += delta;
                for (p, &x) in preds.iter_mut().zip(col.iter()) {
                    *p += delta * x;
                }
            }

            if round % 25 == 0 {
                let rmse = (preds
                    .iter()
                    .zip(targets.iter())
                    .map(|(&p, &y)| ((p - y) as f64).powi(2))
                    .sum::<f64>()
                    / n_samples.max(1) as f64)
                    .sqrt();
                tracing::debug!(round, rmse, "coordinate descent round");
            }
        }

        LinearModel { weights, bias }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn fits_exact_linear_relation() {
        // y = 2 + 3*a - b over a small grid.
        let mut a = Vec::new();
        let mut b = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let av = (i % 8) as f32 * 0.5;
            let bv = (i / 8) as f32;
            a.push(av);
            b.push(bv);
            y.push(2.0 + 3.0 * av - bv);
        }
        let n = y.len();
        let mut values = ndarray::Array2::zeros((2, n));
        values.row_mut(0).assign(&Array1::from_vec(a));
        values.row_mut(1).assign(&Array1::from_vec(b));
        let frame = FeatureFrame::new(vec!["a".into(), "b".into()], values);
        let targets = Array1::from_vec(y);

        let params = LinearParams {
            n_rounds: 300,
            lambda: 1e-3,
            ..LinearParams::default()
        };
        let model = LinearTrainer::new(params).fit(&frame, targets.view());

        assert_relative_eq!(model.weights[0], 3.0, epsilon = 0.05);
        assert_relative_eq!(model.weights[1], -1.0, epsilon = 0.05);

        let preds = model.predict(&frame);
        for (p, t) in preds.iter().zip(targets.iter()) {
            assert_relative_eq!(*p, *t, epsilon = 0.1);
        }
    }

    #[test]
    fn predict_single_sample() {
        let model = LinearModel {
            weights: vec![2.0, 0.5],
            bias: 1.0,
        };
        let frame = FeatureFrame::single(vec!["a".into(), "b".into()], array![3.0, 4.0]);
        let preds = model.predict(&frame);
        assert_eq!(preds.len(), 1);
        assert_relative_eq!(preds[0], 1.0 + 6.0 + 2.0);
    }

    #[test]
    fn serde_roundtrip() {
        let model = LinearModel {
            weights: vec![1.0, -2.5],
            bias: 0.25,
        };
        let json = serde_json::to_string(&model).unwrap();
        let restored: LinearModel = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, model);
    }
}
