//! Offline training: splitting, evaluation metrics, and the pipeline.
//!
//! - [`train_test_split`]: deterministic seeded partitioning
//! - [`mae`], [`r2`], [`EvalReport`]: regression evaluation
//! - [`TrainingPipeline`]: load → preprocess → split → fit → evaluate →
//!   persist, one shot, no retries

mod metrics;
mod pipeline;
mod split;

pub use metrics::{mae, r2, EvalReport};
pub use pipeline::{PipelineError, TrainingPipeline, TrainingReport};
pub use split::{train_test_split, SplitIndices};
