//! Cancellation and deadline carrier for database calls.
//!
//! A [`Context`] is passed to every context-aware operation. The driver runs
//! its work through [`Context::run`], which races the work against the
//! context's cancel signals and deadline. [`Context::background`] carries
//! neither and is what the context-free calling convention uses.
//!
//! Derived contexts inherit their parent's signals and deadline: cancelling
//! a parent cancels every child, and a child can only tighten the deadline.

use crate::error::{DbError, DbResult};
use futures_util::future::select_all;
use std::future::{Future, pending};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

#[derive(Debug, Clone, Default)]
pub struct Context {
    signals: Vec<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Cancels the context it was created with (and all contexts derived from it).
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Context {
    /// An unbounded context: no deadline, never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that is cancelled when the returned handle fires.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let mut child = self.clone();
        child.signals.push(rx);
        (child, CancelHandle { tx })
    }

    /// Derive a context that expires after `timeout`.
    ///
    /// A timeout too large to represent adds no deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.clone(),
        }
    }

    /// Derive a context that expires at `deadline`, or earlier if the parent does.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let mut child = self.clone();
        child.deadline = Some(match self.deadline {
            Some(parent) => parent.min(deadline),
            None => deadline,
        });
        child
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True when this context can never be cancelled or expire.
    pub fn is_background(&self) -> bool {
        self.signals.is_empty() && self.deadline.is_none()
    }

    /// The reason this context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<DbError> {
        if self.signals.iter().any(|rx| *rx.borrow()) {
            return Some(DbError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(DbError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolve once the context is cancelled or its deadline passes.
    ///
    /// Never resolves for a background context.
    pub async fn done(&self) -> DbError {
        let cancelled = async {
            let waits: Vec<_> = self
                .signals
                .iter()
                .cloned()
                .map(|mut rx| {
                    Box::pin(async move {
                        // A dropped handle can no longer cancel.
                        let fired = rx.wait_for(|cancelled| *cancelled).await.is_ok();
                        if !fired {
                            pending::<()>().await;
                        }
                    })
                })
                .collect();
            if waits.is_empty() {
                pending::<()>().await;
            } else {
                select_all(waits).await;
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            _ = cancelled => DbError::Canceled,
            _ = expired => DbError::DeadlineExceeded,
        }
    }

    /// Drive `work` to completion unless this context finishes first.
    pub async fn run<T, F>(&self, work: F) -> DbResult<T>
    where
        F: Future<Output = DbResult<T>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        if self.is_background() {
            return work.await;
        }

        tokio::select! {
            biased;
            err = self.done() => Err(err),
            result = work => result,
        }
    }
}
