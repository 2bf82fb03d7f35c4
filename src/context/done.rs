//! Completion signaling.
//!
//! Every subscription gets its own single-use channel. The completion flag and
//! the waiter list live behind the node's structural lock, so a subscription
//! either lands in the list before the latch flips or observes the flag and
//! resolves immediately.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::thread;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::warn;

/// The node was dropped while a subscription was still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("context dropped before it completed")]
pub struct Abandoned;

/// Completion state of one node. Always accessed under the structural lock.
#[derive(Debug, Default)]
pub(crate) struct Completion {
    completed: bool,
    waiters: Vec<oneshot::Sender<()>>,
}

impl Completion {
    pub(crate) fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn pending(&self) -> usize {
        self.waiters.len()
    }

    pub(crate) fn subscribe(&mut self) -> DoneHandle {
        if self.completed {
            return DoneHandle::ready();
        }
        let (tx, rx) = oneshot::channel();
        self.waiters.push(tx);
        DoneHandle::new(rx)
    }

    /// Flip the latch. Returns the waiters to notify, or `None` if the node
    /// was already completed.
    pub(crate) fn latch(&mut self) -> Option<Vec<oneshot::Sender<()>>> {
        if self.completed {
            return None;
        }
        self.completed = true;
        Some(std::mem::take(&mut self.waiters))
    }
}

/// Send one notification to each waiter.
pub(crate) fn notify(waiters: Vec<oneshot::Sender<()>>) -> usize {
    let count = waiters.len();
    for tx in waiters {
        // The handle may already be gone; nothing to deliver then.
        let _ = tx.send(());
    }
    count
}

/// Receives exactly one notification when its node completes.
///
/// Use [`DoneHandle::wait`] from synchronous code or `.await` the handle from
/// async code.
#[derive(Debug)]
pub struct DoneHandle {
    rx: oneshot::Receiver<()>,
    outcome: Option<Result<(), Abandoned>>,
}

impl DoneHandle {
    fn new(rx: oneshot::Receiver<()>) -> Self {
        Self { rx, outcome: None }
    }

    fn ready() -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(());
        Self {
            rx,
            outcome: Some(Ok(())),
        }
    }

    /// Block the current thread until the node completes.
    ///
    /// Inside an async runtime the wait is moved to a helper thread, which
    /// still blocks the calling worker; prefer `.await` there.
    pub fn wait(self) -> Result<(), Abandoned> {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        if Handle::try_current().is_err() {
            return self.rx.blocking_recv().map_err(|_| Abandoned);
        }

        let rx = self.rx;
        thread::scope(|scope| {
            let waiter = thread::Builder::new()
                .name("apictx-wait".to_string())
                .spawn_scoped(scope, move || rx.blocking_recv());
            match waiter {
                Ok(waiter) => match waiter.join() {
                    Ok(Ok(())) => Ok(()),
                    _ => Err(Abandoned),
                },
                Err(err) => {
                    warn!(error = %err, "failed to start completion waiter thread");
                    Err(Abandoned)
                }
            }
        })
    }

    /// Check for the notification without blocking.
    pub fn is_done(&mut self) -> bool {
        if self.outcome.is_none() {
            match self.rx.try_recv() {
                Ok(()) => self.outcome = Some(Ok(())),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => self.outcome = Some(Err(Abandoned)),
            }
        }
        matches!(self.outcome, Some(Ok(())))
    }
}

impl Future for DoneHandle {
    type Output = Result<(), Abandoned>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(outcome) = self.outcome {
            return Poll::Ready(outcome);
        }
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(result) => {
                let outcome = result.map_err(|_| Abandoned);
                self.outcome = Some(outcome);
                Poll::Ready(outcome)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
