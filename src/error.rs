use thiserror::Error;

/// Error type for the analysis engine.
///
/// Every failure is reported per series; one series failing never aborts
/// analysis of other independent series. No error is silently downgraded
/// to a default value.
#[derive(Error, Debug)]
pub enum Error {
    /// Not enough non-missing points for a statistically valid computation.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Zero variance / zero standard deviation makes a ratio or z-score undefined.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// Incompatible mode and data, e.g. multiplicative decomposition with
    /// non-positive values.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Distribution fitting did not converge or the input is degenerate.
    #[error("distribution fit failed: {0}")]
    FitFailure(String),

    /// A field required by an index calculation is absent.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// PDSI invoked without a full contiguous lead-in history.
    #[error("insufficient history: {0}")]
    InsufficientHistory(String),

    /// Malformed input that fails a construction invariant.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Parallel vectors of differing lengths.
    #[error("length mismatch: expected {expected}, found {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Timestamps out of order or duplicated.
    #[error("timestamps must be strictly increasing: {0}")]
    NonMonotonicTimestamps(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
