//! Error types for the generator and the recommender.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A generation stage ran out of attempts before finding an admissible candidate.
    #[error("stage {stage} ({band}) unsatisfiable after {attempts} attempts with {accepted} entities accepted")]
    ConstraintUnsatisfiable {
        stage: usize,
        band: String,
        attempts: usize,
        accepted: usize,
    },

    /// Jaccard index of two empty feature sets.
    #[error("jaccard index is undefined for two empty feature sets")]
    DegenerateSimilarity,

    #[error("node {0} not found")]
    NodeNotFound(usize),

    #[error("no node named {0:?}")]
    UnknownNodeName(String),

    #[error("invalid sample size {sample_size} for a universe of {universe_size} features")]
    InvalidSampleSize {
        sample_size: usize,
        universe_size: usize,
    },

    #[error("feature {0} not found")]
    FeatureNotFound(usize),

    #[error("malformed feature matrix: {0}")]
    MalformedMatrix(String),

    #[error("malformed edge on line {line}: {reason}")]
    MalformedEdge { line: u64, reason: String },

    #[error("could not produce {requested} unique names after {attempts} attempts")]
    NameSpaceExhausted { requested: usize, attempts: usize },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
