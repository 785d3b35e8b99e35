//! The error module that contains the crate-wide error type.

/// The error type shared by parsers, engines and the query facade.
///
/// Every variant is caller-distinguishable; the facade returns engine errors
/// verbatim. Fixpoint loops can only fail with [`Error::Cancelled`] or
/// [`Error::Internal`], and a failed loop leaves its inputs unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed grammar or regex text, or a start/final vertex that does not
    /// exist in the queried graph.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Lookup of a graph or variable by name failed.
    #[error("unknown name: {0}")]
    UnknownName(String),
    /// The operand combination is ill-typed, e.g. intersecting a grammar with
    /// a grammar, or mixing element types inside one set.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// What the operation required.
        expected: String,
        /// What it was given.
        actual: String,
    },
    /// The operation exists but is not meaningful on the operand, e.g. Kleene
    /// star on a boolean.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    /// The caller aborted the computation through a [`CancelToken`](crate::utils::CancelToken).
    #[error("query cancelled")]
    Cancelled,
    /// A bug: an internal invariant (usually a matrix dimension) was violated.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
