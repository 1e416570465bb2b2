//! Single-flight gate for token refreshes.
//!
//! Holds the in-flight flag, the queue of callers waiting on the current
//! refresh, and an epoch counter that advances whenever the stored
//! credentials change. All three live behind one mutex that is never held
//! across an `.await`, so admission and settlement are atomic even on a
//! multi-threaded runtime.

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::SessionError;

/// What a settled refresh hands to every waiter: the new access token,
/// or the error that failed the whole batch.
pub type RefreshOutcome = Result<String, SessionError>;

/// Receiving end for one waiter.
pub type OutcomeReceiver = oneshot::Receiver<RefreshOutcome>;

/// How a caller that just saw a 401 should proceed.
#[derive(Debug)]
pub enum Admission {
    /// No refresh was running; the caller must start one. It is already
    /// queued and receives the outcome like every other waiter.
    Lead(OutcomeReceiver),
    /// A refresh is running; wait for it.
    Follow(OutcomeReceiver),
    /// Credentials changed after the caller's request went out; replay
    /// with the current token instead of refreshing again.
    Stale,
}

#[derive(Debug, Default)]
struct GateState {
    in_flight: bool,
    epoch: u64,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// The in-flight flag and pending queue of the refresh coordinator.
#[derive(Debug, Default)]
pub struct RefreshGate {
    state: Mutex<GateState>,
}

impl RefreshGate {
    /// Creates an idle gate at epoch zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current credential epoch. Read it before attaching a token.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.state.lock().epoch
    }

    /// Returns true while a refresh is outstanding.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.state.lock().in_flight
    }

    /// Admits a caller whose request, sent at `seen_epoch`, was rejected with 401.
    pub fn admit(&self, seen_epoch: u64) -> Admission {
        let mut state = self.state.lock();
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            return Admission::Follow(rx);
        }
        if state.epoch != seen_epoch {
            return Admission::Stale;
        }
        state.in_flight = true;
        let (tx, rx) = oneshot::channel();
        state.waiters.push(tx);
        Admission::Lead(rx)
    }

    /// Clears the flag, drains the queue and delivers `outcome` to every
    /// waiter. Returns how many waiters were released.
    pub fn settle(&self, outcome: &RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.state.lock();
            state.in_flight = false;
            state.epoch += 1;
            std::mem::take(&mut state.waiters)
        };
        let released = waiters.len();
        for waiter in waiters {
            // A waiter that went away (caller dropped) simply misses the outcome.
            let _ = waiter.send(outcome.clone());
        }
        released
    }

    /// Marks the credentials as changed outside of a refresh (sign-in, sign-out).
    pub fn advance(&self) {
        self.state.lock().epoch += 1;
    }
}
