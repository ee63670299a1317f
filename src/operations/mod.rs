//! Cancellable async operations

mod operation;
mod state;

pub use operation::{Operation, OperationFuture, OperationInfo, StateChangeHook, StateDetails};
pub use state::OperationState;
