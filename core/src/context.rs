//! Cancellation and deadline handle passed to every call.
//!
//! # Design
//! A `Context` is a cheap clone around a shared cancellation flag plus an
//! optional deadline. Cancelling any clone cancels them all. Transports race
//! their exchange against the context with `Context::run`; when the context
//! finishes first, the exchange future is dropped, which closes its
//! connection, so a cancelled request never completes on the wire.

use std::future::Future;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;

use crate::error::TransportError;

#[derive(Debug, Default)]
struct Signal {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cancellation and deadline scope for one or more calls.
#[derive(Debug, Clone, Default)]
pub struct Context {
    signal: Arc<Signal>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that never expires and is only cancelled explicitly.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that also expires `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that also expires at `deadline`. The earlier deadline
    /// wins; cancellation is shared with `self`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current <= deadline => current,
            _ => deadline,
        };
        Self {
            signal: Arc::clone(&self.signal),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.signal.cancelled.store(true, Ordering::SeqCst);
        self.signal.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.cancelled.load(Ordering::SeqCst)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fail fast if the context is already done.
    pub fn check(&self) -> Result<(), TransportError> {
        if self.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(TransportError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Resolves once `cancel` has been called on any clone.
    pub async fn cancelled(&self) {
        loop {
            let mut notified = pin!(self.signal.notify.notified());
            // Register before checking the flag so a concurrent cancel is not missed.
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Resolves with the reason the context finished: cancellation or deadline.
    pub async fn done(&self) -> TransportError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.cancelled() => TransportError::Cancelled,
                _ = tokio::time::sleep_until(deadline.into()) => TransportError::DeadlineExceeded,
            },
            None => {
                self.cancelled().await;
                TransportError::Cancelled
            }
        }
    }

    /// Drive `operation` until it completes or the context finishes. In the
    /// latter case `operation` is dropped unfinished. An operation that is
    /// ready at the same moment as a cancel still wins.
    pub async fn run<T, F>(&self, operation: F) -> Result<T, TransportError>
    where
        F: Future<Output = Result<T, TransportError>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            result = operation => result,
            reason = self.done() => Err(reason),
        }
    }
}
