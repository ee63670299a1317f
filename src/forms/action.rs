//! Trait abstraction for the caller-supplied submit action

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Snapshot of enabled, valid field values in field order
pub type FormData<V> = IndexMap<String, V>;

/// The work performed when a form is submitted
///
/// The action owns its cancellation handling: it should watch the token and
/// stop early when it fires. Forms live on one thread, so the returned future
/// need not be `Send`.
#[cfg_attr(test, mockall::automock)]
#[async_trait(?Send)]
pub trait SubmitAction<V: 'static, R: 'static> {
    async fn submit(&self, cancellation: CancellationToken, data: FormData<V>) -> Result<R>;
}

#[async_trait(?Send)]
impl<V, R, F, Fut> SubmitAction<V, R> for F
where
    V: 'static,
    R: 'static,
    F: Fn(CancellationToken, FormData<V>) -> Fut,
    Fut: Future<Output = Result<R>> + 'static,
{
    async fn submit(&self, cancellation: CancellationToken, data: FormData<V>) -> Result<R> {
        self(cancellation, data).await
    }
}
