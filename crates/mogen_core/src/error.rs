use thiserror::Error;

/// Error type for corpus loading, feature extraction and statistics handling.
#[derive(Debug, Error)]
pub enum MogenError {
    /// Requested feature name is not in the registry.
    #[error("unknown feature name: {0}")]
    UnknownFeature(String),

    /// Rotation-conversion mode string is not one of the declared set.
    #[error("unsupported rotation conversion: {0}")]
    UnsupportedConversion(String),

    /// Whole-file corpus read failed or the archive is malformed.
    #[error("corpus load failed at {path}: {reason}")]
    CorpusLoad { path: String, reason: String },

    /// Statistics artifact could not be read or written.
    #[error("statistics file error at {path}: {reason}")]
    StatsIo { path: String, reason: String },

    /// An array does not have the shape the operation requires.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Sample index outside the dataset.
    #[error("index {idx} out of bounds (dataset has {len} sequences)")]
    IndexOutOfBounds { idx: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MogenError>;
