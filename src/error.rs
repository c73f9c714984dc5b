//! Error types for the SparseDb row store.

use thiserror::Error;

/// The result type used throughout SparseDb.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for row store operations.
///
/// Every validation and encoding failure is raised while a write batch is
/// being built, before anything reaches the index.
#[derive(Debug, Error)]
pub enum Error {
    /// An invalid argument was provided (bad schema, bad options).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A written row has no value for the schema's primary-key column.
    #[error("Primary key required: {0}")]
    MissingPrimaryKey(String),

    /// A column name is empty or contains a NUL byte.
    #[error("Invalid column name: {0}")]
    InvalidColumnName(String),

    /// A value could not be encoded (type mismatch, NaN key, non-ASCII text).
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The operation is not supported for this key type.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The key has no successor in its key space.
    #[error("Key space exhausted: {0}")]
    KeySpaceExhausted(String),

    /// An index entry or value could not be decoded.
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An internal invariant was violated.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Creates a new encoding error.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Error::Encoding(msg.into())
    }

    /// Creates a new corruption error.
    pub fn corruption(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }

    /// Creates a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
