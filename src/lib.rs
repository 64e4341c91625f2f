//! gemprice: diamond price modeling and similarity lookup.
//!
//! A small training pipeline that preprocesses tabular diamond data, fits a
//! regression model (linear or gradient-boosted trees), evaluates it, and
//! keeps the best model by test-set R²; plus a serving adapter that
//! reproduces the exact training-time feature encoding for single records
//! and a similar-diamond lookup over a reference dataset.
//!
//! # Key Types
//!
//! - [`TrainingPipeline`] - load → preprocess → split → fit → evaluate → persist
//! - [`ModelStore`] - artifact history and the best-model pointer
//! - [`ServeContext`] - prediction and similarity lookup for the HTTP layer
//! - [`ModelFamily`] / [`registry`] - the closed model-family table
//! - [`Strategy`] / [`FeatureFrame`] - canonical feature layouts
//!
//! # Feature-Layout Consistency
//!
//! Every preprocessing strategy materializes its full column template for
//! every row, so a single serving-time record and a training batch always
//! produce the same columns in the same order. Category values outside the
//! fixed vocabularies are hard errors, never silently all-zero rows.

pub mod data;
pub mod features;
pub mod model;
pub mod registry;
pub mod serve;
pub mod store;
pub mod testing;
pub mod training;

// High-level entry points
pub use serve::{Prediction, ServeContext, ServeError, SimilarQuery};
pub use store::{ModelStore, StoreError, TrainedModelArtifact};
pub use training::{EvalReport, PipelineError, TrainingPipeline, TrainingReport};

// Data and feature types
pub use data::{load_records, Record, ValidationError, Vocabulary};
pub use features::{FeatureFrame, Strategy};

// Registry
pub use registry::{FamilySpec, ModelFamily, UnsupportedModelError};
