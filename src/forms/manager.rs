//! Keyed aggregate of form controls with a submit protocol

use super::action::{FormData, SubmitAction};
use super::control::{FormControl, FormControlOptions};
use super::options::{ControlMap, FormOptions, ValidatorContext};
use crate::config::{CancelPolicy, FormsConfig, SubmitPolicy};
use crate::errors::FormError;
use crate::events::{
    listener, EventDispatcher, EventKind, EventListener, EventSource, FormControlEvent, FormEvent,
};
use crate::operations::Operation;
use crate::validation::{ValidationError, ValidatorFn, ValidatorFnFactory};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tokio_util::sync::CancellationToken;

/// Fixed set of named fields with shared validity, availability and busy state
///
/// Field events are re-emitted on the form's own dispatcher as
/// [`FormEvent::Control`] tagged with the field key. Form validity is only
/// recomputed by [`validate`](Self::validate); field mutations do not update it.
pub struct FormManager<V: 'static, R: 'static> {
    // Validator contexts hold this map weakly
    controls: Rc<ControlMap<V>>,
    valid: Cell<bool>,
    disabled: Cell<bool>,
    // Submits currently holding a BusyGuard
    in_flight: Cell<usize>,
    errors: RefCell<Option<ValidationError>>,
    dispatcher: Rc<EventDispatcher<FormEvent<V>>>,
    action: Option<Rc<dyn SubmitAction<V, R>>>,
    submit_policy: SubmitPolicy,
    cancel_policy: CancelPolicy,
}

impl<V, R> FormManager<V, R>
where
    V: Clone + PartialEq + 'static,
    R: Clone + 'static,
{
    /// Build one control per schema entry, in iteration order
    ///
    /// Options for keys absent from the schema are ignored.
    pub fn new<K, I>(schema: I, mut options: FormOptions<V>) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let dispatcher: Rc<EventDispatcher<FormEvent<V>>> = Rc::new(EventDispatcher::new());

        let controls = Rc::new_cyclic(|registry: &Weak<ControlMap<V>>| {
            let context = Rc::new(ValidatorContext::new(registry.clone()));
            let mut controls = ControlMap::new();

            for (key, value) in schema {
                let key = key.into();
                let field_options = options.remove(&key).unwrap_or_default();

                let validator_factories = field_options
                    .validators
                    .into_iter()
                    .map(|configuration| {
                        let context = Rc::clone(&context);
                        Rc::new(move || -> ValidatorFn<V> { configuration(&*context) })
                            as ValidatorFnFactory<V>
                    })
                    .collect();

                let control = Rc::new(FormControl::with_options(
                    value,
                    FormControlOptions {
                        validator_factories,
                        disabled: field_options.disabled,
                    },
                ));

                let forward = Rc::downgrade(&dispatcher);
                let control_key = key.clone();
                control.add_events_listener(listener(move |event: &FormControlEvent<V>| {
                    if let Some(dispatcher) = forward.upgrade() {
                        dispatcher.dispatch(&FormEvent::Control {
                            control: control_key.clone(),
                            event: event.clone(),
                        });
                    }
                }));

                controls.insert(key, control);
            }
            controls
        });

        if !options.is_empty() {
            tracing::warn!(
                keys = ?options.keys().collect::<Vec<_>>(),
                "ignoring options for unknown fields"
            );
        }

        Self {
            controls,
            valid: Cell::new(true),
            disabled: Cell::new(false),
            in_flight: Cell::new(0),
            errors: RefCell::new(None),
            dispatcher,
            action: None,
            submit_policy: SubmitPolicy::default(),
            cancel_policy: CancelPolicy::default(),
        }
    }

    /// Set the async action invoked by [`submit`](Self::submit)
    pub fn with_action<A>(mut self, action: A) -> Self
    where
        A: SubmitAction<V, R> + 'static,
    {
        self.action = Some(Rc::new(action));
        self
    }

    pub fn with_submit_policy(mut self, policy: SubmitPolicy) -> Self {
        self.submit_policy = policy;
        self
    }

    /// Policy for the operation that runs each submit
    pub fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.cancel_policy = policy;
        self
    }

    pub fn with_config(self, config: &FormsConfig) -> Self {
        self.with_submit_policy(config.submit_policy)
            .with_cancel_policy(config.cancel_policy)
    }

    pub fn submit_policy(&self) -> SubmitPolicy {
        self.submit_policy
    }

    pub fn cancel_policy(&self) -> CancelPolicy {
        self.cancel_policy
    }

    /// Result of the last [`validate`](Self::validate) call
    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.get() > 0
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Merged errors from the last [`validate`](Self::validate) call
    pub fn errors(&self) -> Option<ValidationError> {
        self.errors.borrow().clone()
    }

    pub fn get_control(&self, key: &str) -> Option<Rc<FormControl<V>>> {
        self.controls.get(key).cloned()
    }

    pub(crate) fn control_ref(&self, key: &str) -> Option<&FormControl<V>> {
        self.controls.get(key).map(Rc::as_ref)
    }

    /// `(key, control)` pairs in field order
    pub fn controls(&self) -> impl Iterator<Item = (&str, &Rc<FormControl<V>>)> {
        self.controls.iter().map(|(key, control)| (key.as_str(), control))
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Validate every field and merge their errors
    ///
    /// Later fields overwrite earlier ones on key collision.
    pub fn validate(&self) -> Option<ValidationError> {
        let mut merged: Option<ValidationError> = None;
        for control in self.controls.values() {
            if let Some(error) = control.validate() {
                match merged.as_mut() {
                    Some(merged) => merged.merge(error),
                    None => merged = Some(error),
                }
            }
        }

        self.valid.set(merged.is_none());
        self.errors.replace(merged.clone());
        merged
    }

    /// Marks the form disabled; fields keep their own availability
    pub fn disable(&self) {
        self.disabled.set(true);
    }

    pub fn enable(&self) {
        self.disabled.set(false);
    }

    /// Values of fields that are both enabled and valid
    pub fn form_data(&self) -> FormData<V> {
        self.controls
            .iter()
            .filter(|(_, control)| !control.is_disabled() && control.is_valid())
            .map(|(key, control)| (key.clone(), control.value()))
            .collect()
    }

    /// Validate, snapshot and hand the data to the action
    ///
    /// Busy is raised only once validation passes and is lowered on every
    /// exit path, including the returned future being dropped.
    pub async fn submit(&self, cancellation: CancellationToken) -> Result<R, FormError> {
        let action = self.action.clone().ok_or(FormError::MissingAction)?;

        if self.is_busy() && self.submit_policy == SubmitPolicy::Reject {
            tracing::warn!("rejecting submit while another is in flight");
            return Err(FormError::SubmitInProgress);
        }

        if let Some(errors) = self.validate() {
            tracing::debug!(keys = ?errors.keys().collect::<Vec<_>>(), "form is invalid");
            return Err(FormError::InvalidForm(errors));
        }

        let _busy = BusyGuard::enter(self);
        let data = self.form_data();
        tracing::debug!(fields = data.len(), "submitting form");

        let operation = Operation::with_token("submit", cancellation.child_token(), move |token| {
            async move { action.submit(token, data).await }
        })?
        .with_cancel_policy(self.cancel_policy);
        let outcome = operation.run().await;

        match &outcome {
            Ok(_) => tracing::debug!("form submitted"),
            Err(error) => tracing::debug!(%error, "form submit failed"),
        }
        outcome
    }

    /// Release the listeners of every field, then of the form
    pub fn clear(&self) {
        for control in self.controls.values() {
            control.clear();
        }
        self.dispatcher.clear();
    }

    fn enter_submit(&self) {
        let previous = self.in_flight.get();
        self.in_flight.set(previous + 1);
        if previous == 0 {
            self.dispatcher.dispatch(&FormEvent::busy(false, true));
        }
    }

    fn leave_submit(&self) {
        let remaining = self.in_flight.get().saturating_sub(1);
        self.in_flight.set(remaining);
        if remaining == 0 {
            self.dispatcher.dispatch(&FormEvent::busy(true, false));
        }
    }
}

impl<V: 'static, R: 'static> EventSource<FormEvent<V>> for FormManager<V, R> {
    fn add_events_listener(&self, listener: EventListener<FormEvent<V>>) {
        self.dispatcher.add_events_listener(listener);
    }

    fn remove_events_listener(&self, listener: &EventListener<FormEvent<V>>) {
        self.dispatcher.remove_events_listener(listener);
    }

    fn add_event_listener(&self, kind: EventKind, listener: EventListener<FormEvent<V>>) {
        self.dispatcher.add_event_listener(kind, listener);
    }

    fn remove_event_listener(&self, kind: EventKind, listener: &EventListener<FormEvent<V>>) {
        self.dispatcher.remove_event_listener(kind, listener);
    }
}

/// Holds the form busy until dropped
///
/// Busy is raised by the first guard and lowered by the last one, so
/// overlapping submits report a single transition each way.
struct BusyGuard<'a, V, R>
where
    V: Clone + PartialEq + 'static,
    R: Clone + 'static,
{
    form: &'a FormManager<V, R>,
}

impl<'a, V, R> BusyGuard<'a, V, R>
where
    V: Clone + PartialEq + 'static,
    R: Clone + 'static,
{
    fn enter(form: &'a FormManager<V, R>) -> Self {
        form.enter_submit();
        Self { form }
    }
}

impl<V, R> Drop for BusyGuard<'_, V, R>
where
    V: Clone + PartialEq + 'static,
    R: Clone + 'static,
{
    fn drop(&mut self) {
        self.form.leave_submit();
    }
}
