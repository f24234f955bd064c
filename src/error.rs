use coordination_common::ParticleType;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the coordination analysis, from a single dump record up to a whole run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("malformed frame {source_name} line {line}: {reason}")]
    MalformedFrame {
        source_name: String,
        line: usize,
        reason: String,
    },
    #[error("reference particle {0} not found in snapshot")]
    ReferenceNotFound(u64),
    #[error("no particles within cutoff of reference particle {0}")]
    EmptyNeighborhood(u64),
    #[error("snapshot has {found} particles of type {target}, sample needs {required}")]
    InsufficientSample {
        target: ParticleType,
        found: usize,
        required: usize,
    },
    #[error("frame file missing: {}", .0.display())]
    MissingFrame(PathBuf),
    #[error("run data unusable at {}: {reason}", .path.display())]
    MissingRunData { path: PathBuf, reason: String },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
