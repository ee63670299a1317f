//! Ordered first-failure validator chain

use super::error::ValidationError;
use super::validator::Validator;
use std::rc::Rc;

/// Runs validators in order and stops at the first error
pub struct ValidatorsComposer<T> {
    validators: Vec<Rc<dyn Validator<T>>>,
}

impl<T> ValidatorsComposer<T> {
    pub fn new(validators: Vec<Rc<dyn Validator<T>>>) -> Self {
        Self { validators }
    }

    pub fn add(&mut self, validator: Rc<dyn Validator<T>>) -> &mut Self {
        self.validators.push(validator);
        self
    }

    /// Remove every occurrence of this exact validator
    pub fn remove(&mut self, validator: &Rc<dyn Validator<T>>) -> &mut Self {
        self.validators.retain(|v| !Rc::ptr_eq(v, validator));
        self
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl<T> Default for ValidatorsComposer<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> Validator<T> for ValidatorsComposer<T> {
    fn validate(&self, value: &T) -> Option<ValidationError> {
        self.validators.iter().find_map(|v| v.validate(value))
    }
}
