use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SummaryError {
    /// Empty or malformed samples.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Related inputs disagree on their number of draws or units.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// The requested interval width can't be turned into a valid index.
    #[error("width {width} out of range: {reason}")]
    OutOfRange { width: f64, reason: &'static str },
}

impl SummaryError {
    pub(crate) fn shape(expected: impl ToString, actual: impl ToString) -> SummaryError {
        SummaryError::ShapeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
