//! One-shot readiness signal that defers calls until the analytics SDK is attached.
//!
//! The gate settles exactly once, either with the SDK handle or with the error that prevented it
//! from loading. Both outcomes live in the same cell, so every caller suspended in
//! [`ReadinessGate::wait`] observes a load failure instead of waiting forever.

use std::fmt;

use async_lock::OnceCell;
use futures::FutureExt;

use crate::analytics::error::{internal_error, AnalyticsError, AnalyticsResult};

/// Observable state of a [`ReadinessGate`]. `Ready` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    Pending,
    Ready,
    Failed,
}

pub struct ReadinessGate<T> {
    cell: OnceCell<Result<T, AnalyticsError>>,
}

impl<T> ReadinessGate<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Creates a gate that is already open, for targets where the SDK exists at load time.
    pub fn resolved(value: T) -> Self {
        Self {
            cell: OnceCell::from(Ok(value)),
        }
    }

    /// Opens the gate, releasing every pending waiter with `value`.
    pub async fn resolve(&self, value: T) -> AnalyticsResult<()> {
        self.settle(Ok(value)).await
    }

    /// Closes the gate permanently; pending and future waiters receive `error`.
    pub async fn fail(&self, error: AnalyticsError) -> AnalyticsResult<()> {
        self.settle(Err(error)).await
    }

    /// Fails the gate without awaiting. Returns `false` when it is already settled or another
    /// caller is settling it.
    pub(crate) fn fail_now(&self, error: AnalyticsError) -> bool {
        matches!(self.settle(Err(error)).now_or_never(), Some(Ok(())))
    }

    /// Suspends until the gate settles.
    pub async fn wait(&self) -> AnalyticsResult<&T> {
        match self.cell.wait().await {
            Ok(value) => Ok(value),
            Err(err) => Err(err.clone()),
        }
    }

    /// Returns the stored value without waiting.
    pub fn get(&self) -> Option<&T> {
        self.cell.get().and_then(|outcome| outcome.as_ref().ok())
    }

    /// Returns the stored failure without waiting.
    pub fn error(&self) -> Option<&AnalyticsError> {
        self.cell.get().and_then(|outcome| outcome.as_ref().err())
    }

    pub fn state(&self) -> GateState {
        match self.cell.get() {
            None => GateState::Pending,
            Some(Ok(_)) => GateState::Ready,
            Some(Err(_)) => GateState::Failed,
        }
    }

    async fn settle(&self, outcome: Result<T, AnalyticsError>) -> AnalyticsResult<()> {
        self.cell
            .set(outcome)
            .await
            .map(|_| ())
            .map_err(|_| internal_error("readiness signal has already been settled"))
    }
}

impl<T> Default for ReadinessGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ReadinessGate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadinessGate")
            .field("state", &self.state())
            .finish()
    }
}
