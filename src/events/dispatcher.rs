//! Typed publish/subscribe hub

use super::event::DomainEvent;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A shared listener; identity is the `Rc` allocation
pub type EventListener<E> = Rc<dyn Fn(&E)>;

/// Wrap a closure as an [`EventListener`]
pub fn listener<E, F>(f: F) -> EventListener<E>
where
    F: Fn(&E) + 'static,
{
    Rc::new(f)
}

/// Subscription API shared by the dispatcher, fields and forms
pub trait EventSource<E: DomainEvent> {
    /// Subscribe to every event
    fn add_events_listener(&self, listener: EventListener<E>);

    fn remove_events_listener(&self, listener: &EventListener<E>);

    /// Subscribe to events of one kind only
    fn add_event_listener(&self, kind: E::Kind, listener: EventListener<E>);

    fn remove_event_listener(&self, kind: E::Kind, listener: &EventListener<E>);
}

/// Synchronous in-process dispatcher
///
/// Catch-all listeners run first, then listeners registered for the event's
/// kind, each group in insertion order. Listeners registered twice are kept
/// once. A panicking listener unwinds through [`dispatch`](Self::dispatch)
/// and later listeners are not called.
pub struct EventDispatcher<E: DomainEvent> {
    listeners: RefCell<Vec<EventListener<E>>>,
    typed_listeners: RefCell<HashMap<E::Kind, Vec<EventListener<E>>>>,
}

impl<E: DomainEvent> EventDispatcher<E> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            typed_listeners: RefCell::new(HashMap::new()),
        }
    }

    /// Deliver an event to every matching listener before returning
    pub fn dispatch(&self, event: &E) {
        let kind = event.kind();
        tracing::trace!(?kind, "dispatching event");

        // Snapshot so listeners may (un)subscribe while being called
        let listeners: Vec<_> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(event);
        }

        let typed: Vec<_> = self
            .typed_listeners
            .borrow()
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        for listener in typed {
            listener(event);
        }
    }

    /// Drop every listener of both kinds
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
        self.typed_listeners.borrow_mut().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
            + self
                .typed_listeners
                .borrow()
                .values()
                .map(Vec::len)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.listener_count() == 0
    }
}

impl<E: DomainEvent> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DomainEvent> EventSource<E> for EventDispatcher<E> {
    fn add_events_listener(&self, listener: EventListener<E>) {
        let mut listeners = self.listeners.borrow_mut();
        if !listeners.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    fn remove_events_listener(&self, listener: &EventListener<E>) {
        self.listeners
            .borrow_mut()
            .retain(|l| !Rc::ptr_eq(l, listener));
    }

    fn add_event_listener(&self, kind: E::Kind, listener: EventListener<E>) {
        let mut typed = self.typed_listeners.borrow_mut();
        let listeners = typed.entry(kind).or_default();
        if !listeners.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    fn remove_event_listener(&self, kind: E::Kind, listener: &EventListener<E>) {
        if let Some(listeners) = self.typed_listeners.borrow_mut().get_mut(&kind) {
            listeners.retain(|l| !Rc::ptr_eq(l, listener));
        }
    }
}
