//! Observable backend state
//!
//! Transitions are checked against [`BackendState::can_transition_to`]; an
//! illegal one is ignored, which is what makes `Fallback` a latch and
//! `Terminated` final even when the init timer, the message pump and a
//! shutdown race each other.

use longtext_core::BackendState;
use std::time::Duration;
use tokio::sync::watch;

pub struct StateMachine {
    tx: watch::Sender<BackendState>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(BackendState::Uninitialized);
        Self { tx }
    }

    pub fn current(&self) -> BackendState {
        *self.tx.borrow()
    }

    /// Move to `next` if allowed; true if the state changed
    pub fn transition(&self, next: BackendState) -> bool {
        let mut from = None;
        let changed = self.tx.send_if_modified(|state| {
            if state.can_transition_to(next) {
                from = Some(*state);
                *state = next;
                true
            } else {
                false
            }
        });

        match from {
            Some(from) => log::info!("Backend state: {from} -> {next}"),
            None => log::debug!("Ignoring backend transition to {next} from {}", self.current()),
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<BackendState> {
        self.tx.subscribe()
    }

    /// Wait until the state is no longer pending, for at most `limit`
    ///
    /// Returns whatever the state is when the wait ends.
    pub async fn settled(&self, limit: Duration) -> BackendState {
        let mut rx = self.subscribe();
        let settled = tokio::time::timeout(limit, rx.wait_for(|s| !s.is_pending()))
            .await
            .ok()
            .and_then(|r| r.ok().map(|state| *state));
        settled.unwrap_or_else(|| self.current())
    }
}
