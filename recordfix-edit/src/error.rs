//! Error types for recordfix-edit.
//!
//! Aborts that leave the model untouched for a known reason (the declaration no longer has the
//! expected shape, or it changed since `prepare`) are distinguished from runtime failures of the
//! model adapter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    /// The live declaration does not match the candidate: a key field, accessor or constructor is
    /// missing, there is no identifier, or the constructor does not fit the header.
    #[error("structural inconsistency: {message}")]
    StructuralInconsistency { message: String },

    /// A declaration changed between preparing and committing the conversion.
    #[error("precondition mismatch: {message}")]
    PreconditionMismatch { message: String },

    #[error("runtime error: {0}")]
    Runtime(#[from] anyhow::Error),
}

impl EditError {
    pub(crate) fn structural(message: impl Into<String>) -> Self {
        EditError::StructuralInconsistency {
            message: message.into(),
        }
    }

    /// True for aborts caused by the state of the model rather than a failing adapter.
    pub fn is_abort(&self) -> bool {
        matches!(
            self,
            EditError::StructuralInconsistency { .. } | EditError::PreconditionMismatch { .. }
        )
    }
}

pub type EditResult<T> = Result<T, EditError>;
