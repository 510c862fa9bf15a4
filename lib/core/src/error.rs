use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Malformed field descriptor at index {index}: {reason}")]
    MalformedField { index: usize, reason: String },

    #[error("Duplicate field '{name}' at indices {first} and {second}")]
    DuplicateField {
        name: String,
        first: usize,
        second: usize,
    },

    #[error("Invalid cluster threshold: {0}")]
    InvalidThreshold(f64),

    #[error("Encoding {index} has a non-finite score")]
    NonFiniteScore { index: usize },

    #[error("Distance between encodings {i} and {j} is not a finite non-negative value")]
    InvalidDistance { i: usize, j: usize },

    #[error("Distance table covers {actual} encodings, expected {expected}")]
    DistanceTableMismatch { expected: usize, actual: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
