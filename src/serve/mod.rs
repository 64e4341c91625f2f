//! Serving-time inference and lookup.
//!
//! [`ServeContext`] is the boundary the HTTP layer talks to. It is
//! constructed once at startup with the model store and the reference
//! dataset, and is read-only during request handling; refreshing the best
//! model is implicit in reading it from the store on every prediction, and
//! there is no process-global state.

mod similar;

pub use similar::{find_similar, SimilarQuery};

use serde::Serialize;
use thiserror::Error;

use crate::data::{Record, ValidationError};
use crate::features::FeatureFrame;
use crate::registry::{self, ModelFamily};
use crate::store::{ModelStore, StoreError};

/// Serving faults, partitioned into client and server responsibility for the
/// HTTP layer (4xx vs 5xx equivalents).
#[derive(Debug, Error)]
pub enum ServeError {
    /// Request body did not deserialize into a record or query.
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No reference diamonds match the similarity query.
    #[error("no matching diamonds found")]
    NoMatches,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServeError {
    /// Whether the fault lies with the request rather than the service.
    pub fn is_client_fault(&self) -> bool {
        match self {
            ServeError::Malformed(_) | ServeError::Validation(_) | ServeError::NoMatches => true,
            ServeError::Store(_) => false,
        }
    }
}

/// A served prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub price: f32,
    /// Which family produced it.
    pub model: ModelFamily,
}

/// Explicit serving context: the model store and the reference dataset.
#[derive(Debug)]
pub struct ServeContext {
    store: ModelStore,
    reference: Vec<Record>,
}

impl ServeContext {
    pub fn new(store: ModelStore, reference: Vec<Record>) -> Self {
        Self { store, reference }
    }

    pub fn reference(&self) -> &[Record] {
        &self.reference
    }

    /// Predict the price of one diamond.
    ///
    /// Loads the best artifact, reproduces its family's exact training-time
    /// feature layout for the single record, predicts, and inverts the target
    /// transform when the family fits in log space.
    pub fn predict(&self, record: &Record) -> Result<Prediction, ServeError> {
        let artifact = self.store.load_best()?;
        let spec = registry::spec_for(artifact.family);

        let row = spec.strategy.preprocess_record(record)?;
        let frame = FeatureFrame::single(spec.strategy.canonical_columns(), row);

        let raw = artifact.model.predict(&frame)[0];
        let price = if spec.log_transform { raw.exp() } else { raw };

        tracing::debug!(family = %artifact.family, price, "served prediction");
        Ok(Prediction {
            price,
            model: artifact.family,
        })
    }

    /// Predict from a raw JSON request body.
    pub fn predict_json(&self, body: &str) -> Result<Prediction, ServeError> {
        let record: Record =
            serde_json::from_str(body).map_err(|e| ServeError::Malformed(e.to_string()))?;
        self.predict(&record)
    }

    /// Similar-diamond lookup against the reference dataset.
    pub fn find_similar(&self, query: &SimilarQuery) -> Result<Vec<Record>, ServeError> {
        similar::find_similar(&self.reference, query)
    }

    /// Similarity lookup from a raw JSON request body.
    pub fn find_similar_json(&self, body: &str) -> Result<Vec<Record>, ServeError> {
        let query: SimilarQuery =
            serde_json::from_str(body).map_err(|e| ServeError::Malformed(e.to_string()))?;
        self.find_similar(&query)
    }
}
