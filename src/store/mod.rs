//! Artifact persistence and the best-model pointer.
//!
//! Every trained model is recorded in a history; the single best artifact by
//! test-set R² is additionally kept in a fixed "best model" slot that the
//! serve path reads on every request.
//!
//! # Directory Layout
//!
//! ```text
//! <root>/model_<YYYY-MM-DD_HH-MM-SS>.json    per-run artifact (history)
//! <root>/all_metrics.json                    append-only metrics history
//! <root>/best_model/best_model.json          best artifact
//! <root>/best_model/best_model_metrics.json  metrics sidecar (inspection only)
//! ```
//!
//! # Concurrency
//!
//! The best artifact is one JSON document holding model state, family,
//! metrics, and timestamp, committed by writing a temp file and atomically
//! renaming it into place. Readers either see the old document or the new
//! one, never a torn pair. A mutex serializes in-process writers and orders
//! the advisory sidecar write with the swap; the training job itself is a
//! one-shot separate process, so cross-process writer races are not a
//! concern.

mod schema;

pub use schema::{ArtifactPayload, ArtifactV1, MetricsEntry};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::model::ModelState;
use crate::registry::ModelFamily;
use crate::training::EvalReport;

const ALL_METRICS_FILE: &str = "all_metrics.json";
const BEST_DIR: &str = "best_model";
const BEST_FILE: &str = "best_model.json";
const BEST_METRICS_FILE: &str = "best_model_metrics.json";

/// One trained model with its metadata. Immutable after creation.
#[derive(Debug, Clone)]
pub struct TrainedModelArtifact {
    pub family: ModelFamily,
    pub model: ModelState,
    pub metrics: EvalReport,
    pub trained_at: DateTime<Utc>,
}

/// Persistence failures. I/O and format faults are reported, never retried
/// or swallowed; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No model has ever been promoted.
    #[error("no trained model is available")]
    NoModelAvailable,
    #[error("store i/o failure at {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt store file {path}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Filesystem-backed model store rooted at one directory.
#[derive(Debug)]
pub struct ModelStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl ModelStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let best_dir = root.join(BEST_DIR);
        fs::create_dir_all(&best_dir).map_err(|source| StoreError::Io {
            path: best_dir.display().to_string(),
            source,
        })?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record an artifact in the history: write the dated model file and
    /// append its metrics to `all_metrics.json`. Promotion is separate.
    pub fn record(&self, artifact: &TrainedModelArtifact) -> Result<PathBuf, StoreError> {
        // Each guarded write commits via an atomic rename, so a writer that
        // panicked mid-section left no partial state; recover the guard.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let stamp = artifact.trained_at.format("%Y-%m-%d_%H-%M-%S");
        let mut path = self.root.join(format!("model_{stamp}.json"));
        // Two runs inside the same second get distinct history files.
        let mut n = 1;
        while path.exists() {
            path = self.root.join(format!("model_{stamp}_{n}.json"));
            n += 1;
        }
        write_json_atomic(&path, &ArtifactPayload::from(artifact))?;

        let metrics_path = self.root.join(ALL_METRICS_FILE);
        let mut history: Vec<MetricsEntry> =
            read_json_or(&metrics_path, Vec::new)?;
        history.push(MetricsEntry {
            family: artifact.family,
            metrics: artifact.metrics,
            trained_at: artifact.trained_at,
        });
        write_json_atomic(&metrics_path, &history)?;

        tracing::info!(path = %path.display(), family = %artifact.family, "recorded artifact");
        Ok(path)
    }

    /// Promote `artifact` to best if its R² is strictly greater than the
    /// current best's (an empty slot always promotes). Returns whether the
    /// promotion happened.
    pub fn promote_if_best(&self, artifact: &TrainedModelArtifact) -> Result<bool, StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let current_r2 = match self.read_best() {
            Ok(best) => Some(best.metrics.r2),
            Err(StoreError::NoModelAvailable) => None,
            Err(e) => return Err(e),
        };
        let is_best = current_r2.map_or(true, |r2| artifact.metrics.r2 > r2);
        if !is_best {
            tracing::info!(
                candidate_r2 = artifact.metrics.r2,
                best_r2 = current_r2,
                "model did not outperform the existing best"
            );
            return Ok(false);
        }

        let best_dir = self.root.join(BEST_DIR);
        write_json_atomic(&best_dir.join(BEST_FILE), &ArtifactPayload::from(artifact))?;
        write_json_atomic(&best_dir.join(BEST_METRICS_FILE), &artifact.metrics)?;

        tracing::info!(
            family = %artifact.family,
            r2 = artifact.metrics.r2,
            previous_r2 = current_r2,
            "promoted new best model"
        );
        Ok(true)
    }

    /// Load the current best artifact.
    ///
    /// Safe for concurrent readers while a promotion is in progress: the best
    /// file is only ever replaced by an atomic rename.
    pub fn load_best(&self) -> Result<TrainedModelArtifact, StoreError> {
        self.read_best()
    }

    /// The full metrics history, oldest first.
    pub fn metrics_history(&self) -> Result<Vec<MetricsEntry>, StoreError> {
        read_json_or(&self.root.join(ALL_METRICS_FILE), Vec::new)
    }

    fn read_best(&self) -> Result<TrainedModelArtifact, StoreError> {
        let path = self.root.join(BEST_DIR).join(BEST_FILE);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NoModelAvailable)
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        let payload: ArtifactPayload =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Format {
                path: path.display().to_string(),
                source,
            })?;
        Ok(payload.into())
    }
}

/// Serialize `value` to a temp file next to `path`, then atomically rename it
/// into place.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    };

    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Format {
        path: path.display().to_string(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &bytes).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

/// Read JSON from `path`, or produce a default when the file does not exist.
fn read_json_or<T: DeserializeOwned>(
    path: &Path,
    default: impl FnOnce() -> T,
) -> Result<T, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(default()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Format {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearModel;

    fn artifact(r2: f64) -> TrainedModelArtifact {
        TrainedModelArtifact {
            family: ModelFamily::Linear,
            model: ModelState::Linear(LinearModel {
                weights: vec![r2 as f32],
                bias: 0.0,
            }),
            metrics: EvalReport { mae: 100.0, r2 },
            trained_at: Utc::now(),
        }
    }

    #[test]
    fn empty_store_has_no_best() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.load_best(),
            Err(StoreError::NoModelAvailable)
        ));
    }

    #[test]
    fn promotion_follows_strictly_greater_r2() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();

        let sequence = [0.5, 0.7, 0.6, 0.9, 0.8];
        let expected_promotions = [true, true, false, true, false];

        for (r2, expected) in sequence.iter().zip(expected_promotions) {
            let promoted = store.promote_if_best(&artifact(*r2)).unwrap();
            assert_eq!(promoted, expected, "r2 = {r2}");
        }

        let best = store.load_best().unwrap();
        assert_eq!(best.metrics.r2, 0.9);
    }

    #[test]
    fn equal_r2_does_not_promote() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();
        assert!(store.promote_if_best(&artifact(0.8)).unwrap());
        assert!(!store.promote_if_best(&artifact(0.8)).unwrap());
    }

    #[test]
    fn record_appends_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();

        let p1 = store.record(&artifact(0.5)).unwrap();
        let p2 = store.record(&artifact(0.6)).unwrap();
        assert_ne!(p1, p2);
        assert!(p1.exists() && p2.exists());

        let history = store.metrics_history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].metrics.r2, 0.5);
        assert_eq!(history[1].metrics.r2, 0.6);
    }

    #[test]
    fn best_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = ModelStore::open(dir.path()).unwrap();
            store.promote_if_best(&artifact(0.9)).unwrap();
        }
        let store = ModelStore::open(dir.path()).unwrap();
        let best = store.load_best().unwrap();
        assert_eq!(best.metrics.r2, 0.9);
        assert_eq!(best.family, ModelFamily::Linear);
    }

    #[test]
    fn corrupt_best_file_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();
        fs::write(dir.path().join(BEST_DIR).join(BEST_FILE), b"not json").unwrap();
        assert!(matches!(store.load_best(), Err(StoreError::Format { .. })));
    }

    #[test]
    fn writes_survive_a_poisoned_lock() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(ModelStore::open(dir.path()).unwrap());

        let poisoner = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.write_lock.lock().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(store.write_lock.is_poisoned());

        store.record(&artifact(0.6)).unwrap();
        assert!(store.promote_if_best(&artifact(0.6)).unwrap());
        assert_eq!(store.load_best().unwrap().metrics.r2, 0.6);
    }

    #[test]
    fn no_stray_temp_files_after_promotion() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();
        store.record(&artifact(0.7)).unwrap();
        store.promote_if_best(&artifact(0.7)).unwrap();

        for entry in walk(dir.path()) {
            assert!(
                !entry.to_string_lossy().ends_with(".tmp"),
                "leftover temp file {entry:?}"
            );
        }
    }

    fn walk(dir: &Path) -> Vec<PathBuf> {
        let mut out = Vec::new();
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                out.extend(walk(&path));
            } else {
                out.push(path);
            }
        }
        out
    }
}
