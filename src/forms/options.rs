//! Per-field configuration and the sibling lookup handed to validators

use super::control::FormControl;
use crate::validation::{ValidationError, ValidatorFn};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

pub(crate) type ControlMap<V> = IndexMap<String, Rc<FormControl<V>>>;

/// Builds a validator with access to the other fields of the form
pub type ValidatorConfiguration<V> = Rc<dyn Fn(&ValidatorContext<V>) -> ValidatorFn<V>>;

/// Options for every field, keyed by field name
pub type FormOptions<V> = HashMap<String, FieldOptions<V>>;

/// Sibling lookup capability for cross-field validators
///
/// Holds the form's controls weakly so validators never keep a form alive.
pub struct ValidatorContext<V> {
    controls: Weak<ControlMap<V>>,
}

impl<V> ValidatorContext<V> {
    pub(crate) fn new(controls: Weak<ControlMap<V>>) -> Self {
        Self { controls }
    }

    /// Look up a field of the same form by key
    pub fn control_of(&self, key: &str) -> Option<Rc<FormControl<V>>> {
        let controls = self.controls.upgrade()?;
        controls.get(key).cloned()
    }
}

/// Validators and initial availability of one field
pub struct FieldOptions<V> {
    pub validators: Vec<ValidatorConfiguration<V>>,
    pub disabled: bool,
}

impl<V: 'static> FieldOptions<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator that may consult sibling fields
    pub fn validator<F, C>(mut self, configure: F) -> Self
    where
        F: Fn(&ValidatorContext<V>) -> C + 'static,
        C: Fn(&V) -> Option<ValidationError> + 'static,
    {
        let configuration: ValidatorConfiguration<V> =
            Rc::new(move |context: &ValidatorContext<V>| -> ValidatorFn<V> {
                Box::new(configure(context))
            });
        self.validators.push(configuration);
        self
    }

    /// Add a validator that only looks at the field's own value
    pub fn check<C>(self, check: C) -> Self
    where
        C: Fn(&V) -> Option<ValidationError> + Clone + 'static,
    {
        self.validator(move |_| check.clone())
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

impl<V> Default for FieldOptions<V> {
    fn default() -> Self {
        Self {
            validators: Vec::new(),
            disabled: false,
        }
    }
}
