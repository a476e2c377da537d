//! Error types for Pulsor.

use thiserror::Error;

/// Failure raised by a primary function or a bound callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// `InvalidFunction` reason: an async primary was forced into sync mode.
pub const ASYNC_IN_SYNC_MODE: &str = "an async function cannot run in sync mode";

/// `InvalidFunction` reason: an async callback was bound to a sync pulser.
pub const ASYNC_CALLBACK_ON_SYNC: &str = "async callbacks need an async pulser";

/// Pulsor errors.
///
/// Every variant is a validation or state error and is returned to the
/// immediate caller of the failing operation.
#[derive(Debug, Error)]
pub enum PulsorError {
    /// Alias is empty after trimming or longer than the allowed length.
    #[error("Invalid alias: {0}")]
    InvalidAlias(&'static str),

    /// Function cannot be used where it was given.
    ///
    /// Raised for execution-mode conflicts: an async primary forced into
    /// [`ExecutionMode::Sync`](crate::ExecutionMode::Sync), or an async
    /// callback bound to a sync pulser. `reason` is [`ASYNC_IN_SYNC_MODE`]
    /// or [`ASYNC_CALLBACK_ON_SYNC`] respectively.
    #[error("Invalid function for '{alias}': {reason}")]
    InvalidFunction {
        /// Alias the function was meant for.
        alias: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A pulser with this alias is already registered.
    #[error("Pulser '{0}' already exists, set override to replace it")]
    AlreadyExists(String),

    /// No pulser with this alias is registered.
    #[error("Pulser '{0}' does not exist")]
    NotFound(String),

    /// This callback is already bound to the alias.
    #[error("Callback is already bound to '{0}'")]
    AlreadyBound(String),

    /// A batch operation failed at a given position.
    #[error("Error binding callback at index {index}: {source}")]
    AtIndex {
        /// Position in the batch.
        index: usize,
        /// Underlying error.
        #[source]
        source: Box<PulsorError>,
    },
}

/// Error kind, for matching without caring about the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidAlias,
    InvalidFunction,
    AlreadyExists,
    NotFound,
    AlreadyBound,
}

impl PulsorError {
    /// Get the error kind, looking through batch positions.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAlias(_) => ErrorKind::InvalidAlias,
            Self::InvalidFunction { .. } => ErrorKind::InvalidFunction,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyBound(_) => ErrorKind::AlreadyBound,
            Self::AtIndex { source, .. } => source.kind(),
        }
    }

    /// Batch position of the failure, if any.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::AtIndex { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub(crate) fn at_index(index: usize, source: PulsorError) -> Self {
        Self::AtIndex {
            index,
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_looks_through_index() {
        let err = PulsorError::at_index(2, PulsorError::AlreadyBound("clicks".into()));
        assert_eq!(err.kind(), ErrorKind::AlreadyBound);
        assert_eq!(err.index(), Some(2));
        assert!(err.to_string().contains("index 2"));
    }

    #[test]
    fn test_display() {
        let err = PulsorError::NotFound("ghost".into());
        assert_eq!(err.to_string(), "Pulser 'ghost' does not exist");
        assert_eq!(err.index(), None);
    }
}
