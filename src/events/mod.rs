//! Event protocol shared by fields and forms

mod dispatcher;
mod event;

pub use dispatcher::{listener, EventDispatcher, EventListener, EventSource};
pub use event::{DomainEvent, EventKind, FormControlEvent, FormEvent};
