//! Event kinds and payloads emitted by fields and forms

use crate::validation::ValidationError;
use std::fmt;
use std::hash::Hash;

/// An immutable change notification carrying a type tag
pub trait DomainEvent {
    /// Tag used for type-scoped listener registration
    type Kind: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// The `type` of a field or form event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Value,
    Validity,
    Availability,
    Error,
    Busy,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Validity => "validity",
            Self::Availability => "availability",
            Self::Error => "error",
            Self::Busy => "busy",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events emitted by a single [`FormControl`](crate::forms::FormControl)
#[derive(Debug, Clone, PartialEq)]
pub enum FormControlEvent<T> {
    Value {
        previous: T,
        current: T,
    },
    Validity {
        previous: bool,
        current: bool,
    },
    /// `true` means enabled
    Availability {
        previous: bool,
        current: bool,
    },
    Error {
        previous: Option<ValidationError>,
        current: Option<ValidationError>,
    },
}

impl<T> DomainEvent for FormControlEvent<T> {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        match self {
            Self::Value { .. } => EventKind::Value,
            Self::Validity { .. } => EventKind::Validity,
            Self::Availability { .. } => EventKind::Availability,
            Self::Error { .. } => EventKind::Error,
        }
    }
}

/// Events emitted by a [`FormManager`](crate::forms::FormManager)
///
/// Control events are the field's own events tagged with the field key.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent<T> {
    Control {
        control: String,
        event: FormControlEvent<T>,
    },
    Busy {
        previous: bool,
        current: bool,
    },
}

impl<T> FormEvent<T> {
    pub fn busy(previous: bool, current: bool) -> Self {
        Self::Busy { previous, current }
    }

    /// Key of the originating field, if any
    pub fn control(&self) -> Option<&str> {
        match self {
            Self::Control { control, .. } => Some(control),
            Self::Busy { .. } => None,
        }
    }
}

impl<T> DomainEvent for FormEvent<T> {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        match self {
            Self::Control { event, .. } => event.kind(),
            Self::Busy { .. } => EventKind::Busy,
        }
    }
}
