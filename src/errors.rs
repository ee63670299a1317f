//! Usage and action errors
//!
//! Validation failures are not errors: they are returned as
//! [`ValidationError`] data and mirrored in field/form state.

use crate::operations::OperationState;
use crate::validation::ValidationError;

/// Errors surfaced by fields, forms and operations
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("A null reference received for the expected instance of -- {0} --")]
    NullReference(String),

    #[error("String {0} cannot be empty")]
    EmptyString(String),

    #[error("Cannot start {state} operation.")]
    InvalidState { state: OperationState },

    #[error("Cannot cancel {state} operation.")]
    CancelTerminal { state: OperationState },

    #[error("Operation {name} was canceled")]
    Canceled { name: String },

    #[error("Action is not defined")]
    MissingAction,

    #[error("Form is invalid")]
    InvalidForm(ValidationError),

    #[error("Form submission already in progress")]
    SubmitInProgress,

    #[error(transparent)]
    Action(#[from] anyhow::Error),
}

impl FormError {
    /// Whether this error came from the caller-supplied action rather than misuse
    pub fn is_action_failure(&self) -> bool {
        matches!(self, FormError::Action(_))
    }
}
