//! Field-by-name access over a form manager

use super::action::SubmitAction;
use super::control::FormControl;
use super::manager::FormManager;
use super::options::FormOptions;
use crate::errors::FormError;
use std::ops::{Deref, Index};
use std::rc::Rc;

/// A [`FormManager`] with checked lookup of fields by name
///
/// Manager methods are reachable through `Deref`; `form["key"]` panics with a
/// null-reference message naming the key when no such field exists.
pub struct Form<V: 'static, R: 'static> {
    manager: FormManager<V, R>,
}

/// Build a form from `(key, initial value)` pairs
pub fn form<V, R, K, I>(schema: I, options: FormOptions<V>) -> Form<V, R>
where
    V: Clone + PartialEq + 'static,
    R: Clone + 'static,
    K: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    Form::from(FormManager::new(schema, options))
}

impl<V, R> Form<V, R>
where
    V: Clone + PartialEq + 'static,
    R: Clone + 'static,
{
    pub fn with_action<A>(self, action: A) -> Self
    where
        A: SubmitAction<V, R> + 'static,
    {
        Self {
            manager: self.manager.with_action(action),
        }
    }

    /// The field for `key`, or a null-reference error naming it
    pub fn field(&self, key: &str) -> Result<Rc<FormControl<V>>, FormError> {
        self.manager
            .get_control(key)
            .ok_or_else(|| FormError::NullReference(key.to_string()))
    }

    pub fn manager(&self) -> &FormManager<V, R> {
        &self.manager
    }

    pub fn into_manager(self) -> FormManager<V, R> {
        self.manager
    }
}

impl<V: 'static, R: 'static> From<FormManager<V, R>> for Form<V, R> {
    fn from(manager: FormManager<V, R>) -> Self {
        Self { manager }
    }
}

impl<V: 'static, R: 'static> Deref for Form<V, R> {
    type Target = FormManager<V, R>;

    fn deref(&self) -> &Self::Target {
        &self.manager
    }
}

impl<V, R> Index<&str> for Form<V, R>
where
    V: Clone + PartialEq + 'static,
    R: Clone + 'static,
{
    type Output = FormControl<V>;

    fn index(&self, key: &str) -> &Self::Output {
        match self.manager.control_ref(key) {
            Some(control) => control,
            None => panic!("{}", FormError::NullReference(key.to_string())),
        }
    }
}
