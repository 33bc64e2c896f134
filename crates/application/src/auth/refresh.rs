//! Single-flight coordination of access token refreshes.
//!
//! At most one refresh is in flight per coordinator. The first caller to
//! [`RefreshCoordinator::join`] becomes the leader and performs the
//! refresh; everyone who joins while it runs gets a [`Waiter`] that
//! resolves when the leader settles. Clearing the flag and draining the
//! queue happen under the same lock, so a waiter can never be enqueued
//! after the drain and left behind.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::trace;

use crate::error::RefreshError;

/// New access token, or why there is none.
pub type RefreshOutcome = Result<String, RefreshError>;

#[derive(Debug, Default)]
struct FlightState {
    in_flight: bool,
    waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

/// Refresh flight flag plus the queue of callers waiting on it.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<FlightState>,
}

/// Role handed out by [`RefreshCoordinator::join`].
#[derive(Debug)]
pub enum Flight<'a> {
    /// No refresh was running; the caller must perform it and settle the guard.
    Leader(FlightGuard<'a>),
    /// A refresh is running; the caller waits for its outcome.
    Follower(Waiter),
}

impl RefreshCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the current flight, or starts one.
    ///
    /// Checking and setting the flag happen under one lock with no
    /// suspension point in between.
    pub fn join(&self) -> Flight<'_> {
        let mut state = self.state.lock();
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            Flight::Follower(Waiter { rx })
        } else {
            state.in_flight = true;
            Flight::Leader(FlightGuard {
                coordinator: self,
                settled: false,
            })
        }
    }

    /// Whether a refresh is currently in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.state.lock().in_flight
    }

    /// Number of callers queued behind the current flight.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Clears the flag and hands `outcome` to every waiter, oldest first.
    fn finish(&self, outcome: &RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.state.lock();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        let mut delivered = 0;
        for waiter in waiters {
            // A closed receiver means that caller was cancelled.
            if waiter.send(outcome.clone()).is_ok() {
                delivered += 1;
            } else {
                trace!("refresh waiter went away before settlement");
            }
        }
        delivered
    }
}

/// Held by the caller performing a refresh.
///
/// Dropping an unsettled guard settles the flight with
/// [`RefreshError::Abandoned`], so the flag is cleared even if the
/// leader's future is cancelled midway.
#[derive(Debug)]
#[must_use = "an unsettled flight is abandoned when dropped"]
pub struct FlightGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl FlightGuard<'_> {
    /// Ends the flight and resolves every queued caller with `outcome`.
    ///
    /// Returns how many queued callers received it.
    pub fn settle(mut self, outcome: &RefreshOutcome) -> usize {
        self.settled = true;
        self.coordinator.finish(outcome)
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.finish(&Err(RefreshError::Abandoned));
        }
    }
}

/// A caller queued behind an in-flight refresh.
#[derive(Debug)]
pub struct Waiter {
    rx: oneshot::Receiver<RefreshOutcome>,
}

impl Waiter {
    /// Suspends until the flight settles.
    pub async fn wait(self) -> RefreshOutcome {
        self.rx.await.unwrap_or(Err(RefreshError::Abandoned))
    }
}
