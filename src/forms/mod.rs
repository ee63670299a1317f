//! Form domain layer
//!
//! This module provides reactive, validated form handling: single
//! [`FormControl`]s, the [`FormManager`] aggregate with its submit protocol,
//! and the name-checked [`Form`] accessor.

mod action;
mod control;
mod field;
mod form;
mod manager;
mod options;

pub use action::{FormData, SubmitAction};
pub use control::{FormControl, FormControlOptions};
pub use field::FieldValue;
pub use form::{form, Form};
pub use manager::FormManager;
pub use options::{FieldOptions, FormOptions, ValidatorConfiguration, ValidatorContext};

#[cfg(test)]
pub use action::MockSubmitAction;
