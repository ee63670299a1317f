//! Reactive validated value slot

use crate::events::{EventDispatcher, EventKind, EventListener, EventSource, FormControlEvent};
use crate::validation::{ValidationError, ValidatorFnFactory};
use std::cell::{Cell, RefCell};
use std::fmt;

/// Construction options for a [`FormControl`]
pub struct FormControlOptions<T> {
    pub validator_factories: Vec<ValidatorFnFactory<T>>,
    pub disabled: bool,
}

impl<T> Default for FormControlOptions<T> {
    fn default() -> Self {
        Self {
            validator_factories: Vec::new(),
            disabled: false,
        }
    }
}

/// A single value with its validity, availability and errors
///
/// All mutation goes through `&self` so a control can be shared between a
/// form and the validators of its sibling fields. Events are delivered
/// synchronously before the mutating call returns.
pub struct FormControl<T> {
    value: RefCell<T>,
    initial: T,
    valid: Cell<bool>,
    disabled: Cell<bool>,
    errors: RefCell<Option<ValidationError>>,
    validator_factories: Vec<ValidatorFnFactory<T>>,
    dispatcher: EventDispatcher<FormControlEvent<T>>,
}

impl<T: Clone + PartialEq> FormControl<T> {
    pub fn new(value: T) -> Self {
        Self::with_options(value, FormControlOptions::default())
    }

    pub fn with_options(value: T, options: FormControlOptions<T>) -> Self {
        Self {
            initial: value.clone(),
            value: RefCell::new(value),
            valid: Cell::new(true),
            disabled: Cell::new(options.disabled),
            errors: RefCell::new(None),
            validator_factories: options.validator_factories,
            dispatcher: EventDispatcher::new(),
        }
    }

    pub fn value(&self) -> T {
        self.value.borrow().clone()
    }

    /// The value the control was constructed with
    pub fn initial_value(&self) -> &T {
        &self.initial
    }

    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    pub fn errors(&self) -> Option<ValidationError> {
        self.errors.borrow().clone()
    }

    pub fn validator_count(&self) -> usize {
        self.validator_factories.len()
    }

    /// Replace the value, emit `value` if it changed, then revalidate
    pub fn set_value(&self, value: T) -> Option<ValidationError> {
        let previous = self.value.replace(value.clone());
        if previous != value {
            self.dispatcher.dispatch(&FormControlEvent::Value {
                previous,
                current: value,
            });
        }
        self.validate()
    }

    /// Restore the construction value
    pub fn reset(&self) -> Option<ValidationError> {
        self.set_value(self.initial.clone())
    }

    /// Run the validator chain unless disabled
    ///
    /// Factories run in registration order; the first error stops the chain.
    pub fn validate(&self) -> Option<ValidationError> {
        if self.disabled.get() {
            return None;
        }

        let value = self.value();
        let result = self
            .validator_factories
            .iter()
            .find_map(|factory| factory()(&value));

        let is_valid = result.is_none();
        let previous_validity = self.valid.replace(is_valid);
        let previous_errors = self.errors.replace(result.clone());

        if previous_validity != is_valid {
            self.dispatcher.dispatch(&FormControlEvent::Validity {
                previous: previous_validity,
                current: is_valid,
            });
        }

        if previous_errors != result {
            self.dispatcher.dispatch(&FormControlEvent::Error {
                previous: previous_errors,
                current: result.clone(),
            });
        }

        result
    }

    pub fn disable(&self) {
        self.set_disabled(true);
    }

    pub fn enable(&self) {
        self.set_disabled(false);
    }

    fn set_disabled(&self, disabled: bool) {
        let previous = self.disabled.replace(disabled);
        if previous != disabled {
            self.dispatcher.dispatch(&FormControlEvent::Availability {
                previous: !previous,
                current: !disabled,
            });
        }
    }

    /// Release every listener; value and validity are untouched
    pub fn clear(&self) {
        self.dispatcher.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.dispatcher.listener_count()
    }
}

impl<T> EventSource<FormControlEvent<T>> for FormControl<T> {
    fn add_events_listener(&self, listener: EventListener<FormControlEvent<T>>) {
        self.dispatcher.add_events_listener(listener);
    }

    fn remove_events_listener(&self, listener: &EventListener<FormControlEvent<T>>) {
        self.dispatcher.remove_events_listener(listener);
    }

    fn add_event_listener(&self, kind: EventKind, listener: EventListener<FormControlEvent<T>>) {
        self.dispatcher.add_event_listener(kind, listener);
    }

    fn remove_event_listener(&self, kind: EventKind, listener: &EventListener<FormControlEvent<T>>) {
        self.dispatcher.remove_event_listener(kind, listener);
    }
}

impl<T: fmt::Debug> fmt::Debug for FormControl<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormControl")
            .field("value", &self.value.borrow())
            .field("valid", &self.valid.get())
            .field("disabled", &self.disabled.get())
            .field("errors", &self.errors.borrow())
            .finish_non_exhaustive()
    }
}
