use thiserror::Error;

/// A specialized `Result` type for range parsing and script generation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while translating a parameterized command line
/// into an array-job script.
#[derive(Debug, Error)]
pub enum Error {
    /// A bracketed body matched none of id-marker, numeric range or list.
    #[error("cannot parse range '{0}'")]
    InvalidRange(String),

    /// A group id was defined more than once.
    #[error("range group '{0}' defined multiple times")]
    DuplicateGroup(String),

    /// A back-reference to a group id that was never defined, or was
    /// defined later in the string (forward references are unsupported).
    #[error("range group '{0}' is not defined")]
    UndefinedGroup(String),

    /// A dimension resolved to zero values. Defensive: expansion already
    /// guarantees at least one value per successfully parsed spec.
    #[error("range dimension {0} expanded to zero values")]
    EmptyDimension(usize),

    /// The supplied parallelism cap was not a positive integer.
    #[error("parallel job limit must be positive, got {0}")]
    InvalidParallelismLimit(i64),

    /// The combination count does not fit in 64 bits.
    #[error("total job count overflows a 64-bit counter")]
    JobCountOverflow,
}
