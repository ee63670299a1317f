//! Validator contract

use super::error::ValidationError;
use std::rc::Rc;

/// A pure check returning an error or nothing
pub type ValidatorFn<T> = Box<dyn Fn(&T) -> Option<ValidationError>>;

/// Produces a fresh [`ValidatorFn`] on every validation pass
pub type ValidatorFnFactory<T> = Rc<dyn Fn() -> ValidatorFn<T>>;

/// Object form of a validator, used by [`ValidatorsComposer`](super::ValidatorsComposer)
pub trait Validator<T> {
    fn validate(&self, value: &T) -> Option<ValidationError>;
}

impl<T, F> Validator<T> for F
where
    F: Fn(&T) -> Option<ValidationError>,
{
    fn validate(&self, value: &T) -> Option<ValidationError> {
        self(value)
    }
}

/// Build a factory from a closure that returns a validator closure
pub fn validator_factory<T, F, V>(make: F) -> ValidatorFnFactory<T>
where
    F: Fn() -> V + 'static,
    V: Fn(&T) -> Option<ValidationError> + 'static,
{
    Rc::new(move || Box::new(make()) as ValidatorFn<T>)
}

/// Factory whose validator is a plain function, re-boxed each pass
pub fn validator_fn<T, F>(check: F) -> ValidatorFnFactory<T>
where
    F: Fn(&T) -> Option<ValidationError> + Clone + 'static,
{
    validator_factory(move || check.clone())
}
