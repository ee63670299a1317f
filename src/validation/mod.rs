//! Validation primitives
//!
//! Validators are pure functions from a value to an optional
//! [`ValidationError`]. Chains stop at the first failure, both inside a
//! field and inside a [`ValidatorsComposer`].

mod composer;
mod error;
mod validator;
mod validators;

pub use composer::ValidatorsComposer;
pub use error::ValidationError;
pub use validator::{validator_factory, validator_fn, Validator, ValidatorFn, ValidatorFnFactory};
pub use validators::{min_length, required, Measurable, MinLength, Required};
