use thiserror::Error;

/// Errors produced by the validation core.
///
/// All of these are reported synchronously and leave no partial results
/// behind; retrying with the same inputs is pointless, so callers should
/// skip the offending record and move on.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// Invalid designer or matcher parameters (even tap count, cutoff
    /// ordering, negative tolerance, ...).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Input sequence length inconsistent with the requested operation.
    #[error("shape mismatch: {0}")]
    Shape(String),

    /// Input data that cannot be interpreted (degenerate signals etc.).
    #[error("malformed input: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
