//! Persisted artifact schema.
//!
//! Schema types are separate from runtime types so the on-disk format can
//! evolve independently: new format versions add payload variants rather than
//! modifying existing ones, and older readers detect unsupported versions by
//! the enum tag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ModelState;
use crate::registry::ModelFamily;
use crate::training::EvalReport;

use super::TrainedModelArtifact;

/// Version-tagged artifact payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "version", rename_all = "snake_case")]
pub enum ArtifactPayload {
    V1(ArtifactV1),
}

/// Version 1: family identifier, evaluation metrics, timestamp, and the full
/// model state in one document. Keeping them together means one atomic file
/// swap replaces the model and its metadata as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactV1 {
    pub family: ModelFamily,
    pub metrics: EvalReport,
    pub trained_at: DateTime<Utc>,
    pub model: ModelState,
}

impl From<&TrainedModelArtifact> for ArtifactPayload {
    fn from(artifact: &TrainedModelArtifact) -> Self {
        ArtifactPayload::V1(ArtifactV1 {
            family: artifact.family,
            metrics: artifact.metrics,
            trained_at: artifact.trained_at,
            model: artifact.model.clone(),
        })
    }
}

impl From<ArtifactPayload> for TrainedModelArtifact {
    fn from(payload: ArtifactPayload) -> Self {
        match payload {
            ArtifactPayload::V1(v1) => TrainedModelArtifact {
                family: v1.family,
                metrics: v1.metrics,
                trained_at: v1.trained_at,
                model: v1.model,
            },
        }
    }
}

/// One row of the append-only metrics history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsEntry {
    pub family: ModelFamily,
    #[serde(flatten)]
    pub metrics: EvalReport,
    pub trained_at: DateTime<Utc>,
}
