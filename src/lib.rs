//! Centy Forms - reactive state and validation for input forms
//!
//! Tracks per-field values, validity, availability and errors, aggregates
//! fields into a named form, and runs a cancellable async submit action.
//!
//! ```ignore
//! use centy_forms::forms::{form, FieldOptions, FieldValue};
//! use centy_forms::validation::required;
//!
//! let mut options = std::collections::HashMap::new();
//! options.insert("title".to_string(), FieldOptions::new().check(|v: &FieldValue| required(v)));
//!
//! let issue = form([("title", FieldValue::text(""))], options)
//!     .with_action(|_token, data| async move { Ok(data.len()) });
//!
//! issue["title"].set_value(FieldValue::text("Fix login"));
//! let submitted = issue.submit(CancellationToken::new()).await?;
//! ```

pub mod config;
pub mod errors;
pub mod events;
pub mod forms;
pub mod operations;
pub mod validation;

pub use config::{CancelPolicy, FormsConfig, SubmitPolicy};
pub use errors::FormError;
pub use events::{EventDispatcher, EventKind, EventSource, FormControlEvent, FormEvent};
pub use forms::{form, FieldOptions, FieldValue, Form, FormControl, FormData, FormManager};
pub use operations::{Operation, OperationInfo, OperationState};
pub use validation::{ValidationError, ValidatorsComposer};
