//! The offline training pipeline.
//!
//! One-shot orchestration: load → preprocess (via the registry) → split →
//! fit → evaluate → persist. Any failure aborts the run before anything is
//! written; nothing is retried.

use std::path::Path;

use chrono::Utc;
use ndarray::{Array1, Axis};
use thiserror::Error;

use crate::data::{load_records, DataError, Record, ValidationError};
use crate::registry::{self, ModelFamily};
use crate::store::{ModelStore, StoreError, TrainedModelArtifact};

use super::metrics::{mae, r2, EvalReport};
use super::split::train_test_split;

/// Fatal pipeline faults. No partial state is persisted when one of these is
/// raised.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("preprocessing produced no trainable rows")]
    EmptyTrainingSet,
    /// A strategy emitted a layout that differs from its canonical columns.
    #[error("feature layout mismatch: expected {expected:?}, got {got:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },
    #[error("split left a partition empty ({n_samples} samples, test fraction {test_fraction})")]
    EmptyPartition { n_samples: usize, test_fraction: f32 },
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub artifact: TrainedModelArtifact,
    /// Whether this run replaced the best model.
    pub promoted: bool,
}

/// One-shot training job for a single model family.
#[derive(Debug, Clone)]
pub struct TrainingPipeline {
    family: ModelFamily,
    seed: u64,
    test_fraction: f32,
}

impl TrainingPipeline {
    pub fn new(family: ModelFamily) -> Self {
        Self {
            family,
            seed: 42,
            test_fraction: 0.2,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_test_fraction(mut self, test_fraction: f32) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    /// Run the pipeline on a CSV file and persist the result through `store`.
    pub fn run(
        &self,
        data_path: impl AsRef<Path>,
        store: &ModelStore,
    ) -> Result<TrainingReport, PipelineError> {
        let records = load_records(data_path)?;
        self.run_on_records(&records, store)
    }

    /// Run the pipeline on already-loaded records.
    pub fn run_on_records(
        &self,
        records: &[Record],
        store: &ModelStore,
    ) -> Result<TrainingReport, PipelineError> {
        let spec = registry::spec_for(self.family);
        tracing::info!(
            family = %self.family,
            n_records = records.len(),
            "starting training run"
        );

        let (frame, prices) = spec.strategy.preprocess_training(records)?;
        let n_samples = frame.n_samples();
        if n_samples == 0 {
            return Err(PipelineError::EmptyTrainingSet);
        }

        let expected = spec.strategy.canonical_columns();
        if frame.names() != expected.as_slice() {
            return Err(PipelineError::SchemaMismatch {
                expected,
                got: frame.names().to_vec(),
            });
        }

        let split = train_test_split(n_samples, self.test_fraction, self.seed);
        if split.train.is_empty() || split.test.is_empty() {
            return Err(PipelineError::EmptyPartition {
                n_samples,
                test_fraction: self.test_fraction,
            });
        }

        let x_train = frame.select_samples(&split.train);
        let x_test = frame.select_samples(&split.test);
        let y_train = prices.select(Axis(0), &split.train);
        let y_test = prices.select(Axis(0), &split.test);

        // Fit in log space when the family asks for it; prices are strictly
        // positive after the quality filter.
        let fit_targets: Array1<f32> = if spec.log_transform {
            y_train.mapv(f32::ln)
        } else {
            y_train
        };

        tracing::info!(
            n_train = x_train.n_samples(),
            n_test = x_test.n_samples(),
            n_features = frame.n_features(),
            "fitting model"
        );
        let model = spec.fit(&x_train, fit_targets.view());

        let mut predictions = model.predict(&x_test);
        if spec.log_transform {
            predictions.mapv_inplace(f32::exp);
        }
        let metrics = EvalReport {
            mae: mae(predictions.view(), y_test.view()),
            r2: r2(predictions.view(), y_test.view()),
        };
        tracing::info!(mae = metrics.mae, r2 = metrics.r2, "evaluation complete");

        let artifact = TrainedModelArtifact {
            family: self.family,
            model,
            metrics,
            trained_at: Utc::now(),
        };
        store.record(&artifact)?;
        let promoted = store.promote_if_best(&artifact)?;

        Ok(TrainingReport { artifact, promoted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::synthetic_records;

    #[test]
    fn pipeline_trains_evaluates_and_promotes() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();
        let records = synthetic_records(400, 7);

        let report = TrainingPipeline::new(ModelFamily::Linear)
            .run_on_records(&records, &store)
            .unwrap();

        // First run always promotes.
        assert!(report.promoted);
        assert!(report.artifact.metrics.r2 > 0.5);
        assert_eq!(report.artifact.family, ModelFamily::Linear);

        let best = store.load_best().unwrap();
        assert_eq!(best.family, ModelFamily::Linear);
    }

    #[test]
    fn log_trained_metrics_are_in_raw_price_space() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();
        let records = synthetic_records(400, 9);
        let mean_price: f32 = records
            .iter()
            .filter_map(|r| r.training_target())
            .sum::<f32>()
            / records.len() as f32;

        // The linear family fits ln(price); a missing exp-invert would leave
        // predictions near ln-scale and blow the MAE up to ~mean price.
        let report = TrainingPipeline::new(ModelFamily::Linear)
            .run_on_records(&records, &store)
            .unwrap();
        assert!(
            report.artifact.metrics.mae < 0.25 * mean_price as f64,
            "MAE {} vs mean price {mean_price}",
            report.artifact.metrics.mae
        );
    }

    #[test]
    fn pipeline_is_reproducible_for_a_seed() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();
        let records = synthetic_records(300, 11);

        let run = |seed| {
            TrainingPipeline::new(ModelFamily::Xgboost)
                .with_seed(seed)
                .run_on_records(&records, &store)
                .unwrap()
                .artifact
                .metrics
        };
        let a = run(1);
        let b = run(1);
        assert_eq!(a, b);
    }

    #[test]
    fn pipeline_rejects_all_filtered_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();
        let mut records = synthetic_records(10, 3);
        for r in &mut records {
            r.price = Some(-1.0);
        }

        let err = TrainingPipeline::new(ModelFamily::Linear)
            .run_on_records(&records, &store)
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyTrainingSet));
        // Nothing was persisted.
        assert!(matches!(
            store.load_best(),
            Err(StoreError::NoModelAvailable)
        ));
    }

    #[test]
    fn pipeline_aborts_on_unknown_category_without_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();
        let mut records = synthetic_records(50, 3);
        records[10].cut = "Superb".into();

        let err = TrainingPipeline::new(ModelFamily::Xgboost)
            .run_on_records(&records, &store)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
        assert!(store.metrics_history().unwrap().is_empty());
    }
}
