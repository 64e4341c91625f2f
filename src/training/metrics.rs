//! Regression evaluation metrics.
//!
//! Metrics accumulate in `f64` regardless of the `f32` feature pipeline.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Evaluation results for one training run.
///
/// Serialized field names match the metrics history format
/// (`"MAE"` / `"R2"`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "R2")]
    pub r2: f64,
}

/// Mean absolute error: `mean(|pred - target|)`. Lower is better.
pub fn mae(predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f64 {
    debug_assert_eq!(predictions.len(), targets.len());
    if predictions.is_empty() {
        return 0.0;
    }
    predictions
        .iter()
        .zip(targets.iter())
        .map(|(&p, &t)| ((p as f64) - (t as f64)).abs())
        .sum::<f64>()
        / predictions.len() as f64
}

/// Coefficient of determination: `1 - ss_res / ss_tot`. Higher is better.
///
/// Returns 0.0 for a constant target (the usual degenerate-case convention).
pub fn r2(predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f64 {
    debug_assert_eq!(predictions.len(), targets.len());
    if predictions.is_empty() {
        return 0.0;
    }
    let mean = targets.iter().map(|&t| t as f64).sum::<f64>() / targets.len() as f64;
    let ss_tot: f64 = targets.iter().map(|&t| ((t as f64) - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = predictions
        .iter()
        .zip(targets.iter())
        .map(|(&p, &t)| ((t as f64) - (p as f64)).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn mae_basic() {
        let preds = array![1.0f32, 2.0, 3.0];
        let targets = array![2.0f32, 2.0, 5.0];
        assert_relative_eq!(mae(preds.view(), targets.view()), 1.0);
    }

    #[test]
    fn r2_perfect_fit_is_one() {
        let y = array![1.0f32, 2.0, 3.0, 4.0];
        assert_relative_eq!(r2(y.view(), y.view()), 1.0);
    }

    #[test]
    fn r2_mean_predictor_is_zero() {
        let targets = array![1.0f32, 2.0, 3.0];
        let preds = array![2.0f32, 2.0, 2.0];
        assert_relative_eq!(r2(preds.view(), targets.view()), 0.0);
    }

    #[test]
    fn r2_constant_target_degenerates_to_zero() {
        let targets = array![5.0f32, 5.0, 5.0];
        let preds = array![4.0f32, 5.0, 6.0];
        assert_relative_eq!(r2(preds.view(), targets.view()), 0.0);
    }

    #[test]
    fn eval_report_serializes_with_history_keys() {
        let report = EvalReport { mae: 350.5, r2: 0.97 };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""MAE":350.5"#));
        assert!(json.contains(r#""R2":0.97"#));
    }
}
