//! Cancellable single-run async task

use super::state::OperationState;
use crate::config::{CancelPolicy, FormsConfig};
use crate::errors::FormError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub type OperationFuture<R> = Pin<Box<dyn Future<Output = anyhow::Result<R>>>>;

type Action<R> = Box<dyn FnOnce(CancellationToken) -> OperationFuture<R>>;

/// Payload passed to the state hook on terminal transitions
pub enum StateDetails<'a, R> {
    Result(&'a R),
    Error(&'a anyhow::Error),
}

/// Serializable snapshot of an operation's metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationInfo {
    pub id: Uuid,
    pub name: String,
    pub state: OperationState,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Single-slot observer of state transitions
pub type StateChangeHook<R> = Box<dyn FnMut(OperationState, Option<StateDetails<'_, R>>)>;

/// A named unit of async work with an observable state machine
///
/// An operation runs at most once. Cancellation is cooperative: the action
/// receives a [`CancellationToken`] and decides when to stop. Whatever the
/// action produces after a cancel is discarded.
pub struct Operation<R> {
    id: Uuid,
    name: String,
    state: Cell<OperationState>,
    result: RefCell<Option<R>>,
    error: RefCell<Option<String>>,
    action: RefCell<Option<Action<R>>>,
    token: CancellationToken,
    cancel_policy: CancelPolicy,
    started_at: Cell<Option<DateTime<Utc>>>,
    completed_at: Cell<Option<DateTime<Utc>>>,
    state_change: RefCell<Option<StateChangeHook<R>>>,
}

impl<R: Clone + 'static> Operation<R> {
    pub fn new<F, Fut>(name: impl Into<String>, action: F) -> Result<Self, FormError>
    where
        F: FnOnce(CancellationToken) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<R>> + 'static,
    {
        Self::with_token(name, CancellationToken::new(), action)
    }

    /// Create an operation that cancels through an existing token
    pub fn with_token<F, Fut>(
        name: impl Into<String>,
        token: CancellationToken,
        action: F,
    ) -> Result<Self, FormError>
    where
        F: FnOnce(CancellationToken) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<R>> + 'static,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(FormError::EmptyString("name".to_string()));
        }

        let action: Action<R> = Box::new(move |token| Box::pin(action(token)));

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            state: Cell::new(OperationState::Idle),
            result: RefCell::new(None),
            error: RefCell::new(None),
            action: RefCell::new(Some(action)),
            token,
            cancel_policy: CancelPolicy::default(),
            started_at: Cell::new(None),
            completed_at: Cell::new(None),
            state_change: RefCell::new(None),
        })
    }

    pub fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.cancel_policy = policy;
        self
    }

    pub fn with_config(self, config: &FormsConfig) -> Self {
        self.with_cancel_policy(config.cancel_policy)
    }

    pub fn cancel_policy(&self) -> CancelPolicy {
        self.cancel_policy
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> OperationState {
        self.state.get()
    }

    pub fn result(&self) -> Option<R> {
        self.result.borrow().clone()
    }

    /// Message of the action's failure, if it failed
    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at.get()
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at.get()
    }

    pub fn info(&self) -> OperationInfo {
        OperationInfo {
            id: self.id,
            name: self.name.clone(),
            state: self.state.get(),
            started_at: self.started_at.get(),
            completed_at: self.completed_at.get(),
            error: self.error(),
        }
    }

    pub fn is_cancellation_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Replace the state hook; only one observer is kept
    pub fn on_state_change<F>(&self, hook: F)
    where
        F: FnMut(OperationState, Option<StateDetails<'_, R>>) + 'static,
    {
        *self.state_change.borrow_mut() = Some(Box::new(hook));
    }

    pub fn clear_state_change(&self) {
        self.state_change.borrow_mut().take();
    }

    /// Execute the action once
    ///
    /// Fails without changing state unless the operation is idle.
    pub async fn run(&self) -> Result<R, FormError> {
        let state = self.state.get();
        if state != OperationState::Idle {
            return Err(FormError::InvalidState { state });
        }
        let action = self
            .action
            .borrow_mut()
            .take()
            .ok_or_else(|| FormError::NullReference("action".to_string()))?;

        self.started_at.set(Some(Utc::now()));
        self.set_state(OperationState::Running, None);

        let outcome = action(self.token.clone()).await;

        if self.state.get() != OperationState::Running {
            tracing::debug!(
                operation = %self.name,
                id = %self.id,
                "discarding outcome of canceled operation"
            );
            return Err(FormError::Canceled {
                name: self.name.clone(),
            });
        }

        self.completed_at.set(Some(Utc::now()));
        match outcome {
            Ok(result) => {
                *self.result.borrow_mut() = Some(result.clone());
                self.set_state(OperationState::Finished, Some(StateDetails::Result(&result)));
                Ok(result)
            }
            Err(error) => {
                *self.error.borrow_mut() = Some(format!("{error:#}"));
                self.set_state(OperationState::Failed, Some(StateDetails::Error(&error)));
                Err(FormError::Action(error))
            }
        }
    }

    /// Signal cancellation and move to `canceled`
    pub fn cancel(&self) -> Result<(), FormError> {
        let state = self.state.get();
        if state.is_terminal() && self.cancel_policy == CancelPolicy::RejectTerminal {
            tracing::warn!(operation = %self.name, %state, "cancel rejected");
            return Err(FormError::CancelTerminal { state });
        }

        self.token.cancel();
        self.action.borrow_mut().take();
        self.completed_at.set(Some(Utc::now()));
        self.set_state(OperationState::Canceled, None);
        Ok(())
    }

    fn set_state(&self, state: OperationState, details: Option<StateDetails<'_, R>>) {
        self.state.set(state);
        tracing::debug!(operation = %self.name, id = %self.id, %state, "operation state changed");

        // Taken out while running so the hook may call back into the operation
        let hook = self.state_change.borrow_mut().take();
        if let Some(mut hook) = hook {
            hook(state, details);
            let mut slot = self.state_change.borrow_mut();
            if slot.is_none() {
                *slot = Some(hook);
            }
        }
    }
}

impl<R> fmt::Debug for Operation<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn record_states<R: Clone + 'static>(op: &Operation<R>) -> Rc<RefCell<Vec<OperationState>>> {
        let states = Rc::new(RefCell::new(vec![op.state()]));
        let sink = Rc::clone(&states);
        op.on_state_change(move |state, _| sink.borrow_mut().push(state));
        states
    }

    mod construction {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_empty_name_is_rejected() {
            let err = Operation::new("", |_| async { Ok("x".to_string()) }).unwrap_err();
            assert_eq!(err.to_string(), "String name cannot be empty");
        }

        #[test]
        fn test_new_operation_is_idle() {
            let op = Operation::new("load", |_| async { Ok(1u32) }).unwrap();
            assert_eq!(op.state(), OperationState::Idle);
            assert_eq!(op.name(), "load");
            assert!(op.result().is_none());
            assert!(op.error().is_none());
            assert!(op.started_at().is_none());
        }

        #[test]
        fn test_ids_are_unique() {
            let a = Operation::new("a", |_| async { Ok(()) }).unwrap();
            let b = Operation::new("b", |_| async { Ok(()) }).unwrap();
            assert_ne!(a.id(), b.id());
        }
    }

    mod info {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_info_serializes_metadata() {
            let op: Operation<u32> =
                Operation::new("upload", |_| async { Err(anyhow!("disk full")) }).unwrap();
            assert!(op.info().started_at.is_none());

            assert_err!(op.run().await);
            let info = op.info();
            let json = serde_json::to_value(&info).unwrap();

            assert_eq!(json["id"], op.id().to_string());
            assert_eq!(json["name"], "upload");
            assert_eq!(json["state"], "failed");
            assert_eq!(json["error"], "disk full");
            assert!(json["started_at"].is_string());

            let parsed: OperationInfo = serde_json::from_value(json).unwrap();
            assert_eq!(parsed, info);
        }
    }

    mod run {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_successful_run_finishes() {
            let op = Operation::new("x", |_| async { Ok("ok".to_string()) }).unwrap();
            let states = record_states(&op);

            let result = op.run().await.unwrap();

            assert_eq!(result, "ok");
            assert_eq!(op.result(), Some("ok".to_string()));
            assert_eq!(
                *states.borrow(),
                vec![
                    OperationState::Idle,
                    OperationState::Running,
                    OperationState::Finished
                ]
            );
            assert!(op.completed_at() >= op.started_at());
        }

        #[tokio::test]
        async fn test_failed_run_reports_error() {
            let op: Operation<u32> = Operation::new("x", |_| async { Err(anyhow!("boom")) }).unwrap();
            let seen = Rc::new(RefCell::new(None));
            let sink = Rc::clone(&seen);
            op.on_state_change(move |state, details| {
                if let Some(StateDetails::Error(error)) = details {
                    *sink.borrow_mut() = Some((state, error.to_string()));
                }
            });

            let err = op.run().await.unwrap_err();

            assert!(err.is_action_failure());
            assert_eq!(err.to_string(), "boom");
            assert_eq!(op.state(), OperationState::Failed);
            assert_eq!(op.error(), Some("boom".to_string()));
            assert_eq!(
                *seen.borrow(),
                Some((OperationState::Failed, "boom".to_string()))
            );
        }

        #[tokio::test]
        async fn test_second_run_names_current_state() {
            let op = Operation::new("x", |_| async { Ok(5u32) }).unwrap();
            assert_ok!(op.run().await);

            let err = op.run().await.unwrap_err();

            assert_eq!(err.to_string(), "Cannot start finished operation.");
            assert_eq!(op.state(), OperationState::Finished);
            assert_eq!(op.result(), Some(5));
        }

        #[tokio::test]
        async fn test_concurrent_run_is_rejected_while_running() {
            let op = Operation::new("x", |_| async {
                tokio::task::yield_now().await;
                Ok("first".to_string())
            })
            .unwrap();

            let (first, second) = tokio::join!(op.run(), op.run());

            assert_eq!(first.unwrap(), "first");
            assert_eq!(second.unwrap_err().to_string(), "Cannot start running operation.");
            assert_eq!(op.state(), OperationState::Finished);
        }

        #[test]
        fn test_run_with_block_on() {
            let op = Operation::new("sync", |_| async { Ok(3u8) }).unwrap();
            let result = tokio_test::block_on(op.run());
            assert_eq!(result.unwrap(), 3);
        }
    }

    mod cancel {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_cooperative_cancel_during_run() {
            let op = Operation::new("slow", |token: CancellationToken| async move {
                tokio::select! {
                    _ = token.cancelled() => Err(anyhow!("aborted")),
                    _ = tokio::time::sleep(Duration::from_secs(30)) => Ok(1u32),
                }
            })
            .unwrap();
            let states = record_states(&op);

            let (run, cancel) = tokio::join!(op.run(), async { op.cancel() });

            assert_ok!(cancel);
            assert!(matches!(run, Err(FormError::Canceled { .. })));
            assert_eq!(op.state(), OperationState::Canceled);
            assert!(op.is_cancellation_requested());
            assert!(op.error().is_none());
            assert_eq!(
                *states.borrow(),
                vec![
                    OperationState::Idle,
                    OperationState::Running,
                    OperationState::Canceled
                ]
            );
        }

        #[tokio::test]
        async fn test_non_cooperative_action_outcome_is_discarded() {
            let op = Operation::new("stubborn", |_| async {
                tokio::task::yield_now().await;
                Ok("late".to_string())
            })
            .unwrap();

            let (run, _) = tokio::join!(op.run(), async { op.cancel() });

            assert_err!(run);
            assert_eq!(op.state(), OperationState::Canceled);
            assert!(op.result().is_none());
        }

        #[tokio::test]
        async fn test_cancel_before_run_prevents_run() {
            let op = Operation::new("x", |_| async { Ok(()) }).unwrap();
            assert_ok!(op.cancel());

            let err = op.run().await.unwrap_err();

            assert_eq!(err.to_string(), "Cannot start canceled operation.");
        }

        #[tokio::test]
        async fn test_cancel_after_finish_is_rejected_by_default() {
            let op = Operation::new("x", |_| async { Ok(()) }).unwrap();
            op.run().await.unwrap();

            let err = op.cancel().unwrap_err();

            assert_eq!(err.to_string(), "Cannot cancel finished operation.");
            assert_eq!(op.state(), OperationState::Finished);
            assert!(!op.is_cancellation_requested());
        }

        #[tokio::test]
        async fn test_cancel_after_finish_with_always_policy() {
            let op = Operation::new("x", |_| async { Ok(()) })
                .unwrap()
                .with_cancel_policy(CancelPolicy::Always);
            op.run().await.unwrap();

            assert_ok!(op.cancel());
            assert_eq!(op.state(), OperationState::Canceled);
        }

        #[tokio::test]
        async fn test_loaded_config_sets_cancel_policy() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.json");
            std::fs::write(&path, r#"{"cancel_policy": "always"}"#).unwrap();
            let config = FormsConfig::load_from(&path).unwrap();

            let op = Operation::new("x", |_| async { Ok(()) })
                .unwrap()
                .with_config(&config);
            op.run().await.unwrap();

            assert_eq!(op.cancel_policy(), CancelPolicy::Always);
            assert_ok!(op.cancel());
            assert_eq!(op.state(), OperationState::Canceled);
        }
    }

    mod hook {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_only_latest_hook_is_called() {
            let op = Operation::new("x", |_| async { Ok(()) }).unwrap();
            let first = Rc::new(Cell::new(0));
            let second = Rc::new(Cell::new(0));
            let f = Rc::clone(&first);
            let s = Rc::clone(&second);
            op.on_state_change(move |_, _| f.set(f.get() + 1));
            op.on_state_change(move |_, _| s.set(s.get() + 1));

            op.run().await.unwrap();

            assert_eq!(first.get(), 0);
            assert_eq!(second.get(), 2);
        }

        #[tokio::test]
        async fn test_finished_hook_receives_result() {
            let op = Operation::new("x", |_| async { Ok(9i32) }).unwrap();
            let seen = Rc::new(Cell::new(None));
            let sink = Rc::clone(&seen);
            op.on_state_change(move |_, details| {
                if let Some(StateDetails::Result(value)) = details {
                    sink.set(Some(*value));
                }
            });

            op.run().await.unwrap();

            assert_eq!(seen.get(), Some(9));
        }

        #[tokio::test]
        async fn test_cleared_hook_is_not_called() {
            let op = Operation::new("x", |_| async { Ok(()) }).unwrap();
            let calls = Rc::new(Cell::new(0));
            let c = Rc::clone(&calls);
            op.on_state_change(move |_, _| c.set(c.get() + 1));
            op.clear_state_change();

            op.run().await.unwrap();

            assert_eq!(calls.get(), 0);
        }
    }
}
