// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The session store: one task owns the state, everyone else dispatches.
//!
//! Every [`Action`] from UI handlers and live-update listeners funnels
//! through a single channel into one fold task, so the reducer is the only
//! writer and interleaved partial updates cannot happen. Snapshots go out
//! on a watch channel; readers see each state exactly as the reducer
//! produced it.

use crate::client::state::{reduce, Action, SessionState};
use tokio::sync::{mpsc, watch};

/// Handle to a running session store.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::UnboundedSender<Action>,
    snapshot: watch::Receiver<SessionState>,
}

impl StoreHandle {
    /// Queue an action for the fold task.
    ///
    /// Dispatching after the store has shut down is silently ignored; this
    /// is what makes late mutation responses harmless after teardown.
    pub fn dispatch(&self, action: Action) {
        if self.tx.send(action).is_err() {
            tracing::debug!("Dispatch after store shutdown; dropped");
        }
    }

    /// The latest state snapshot.
    pub fn state(&self) -> SessionState {
        self.snapshot.borrow().clone()
    }

    /// Watch for state changes (one receiver per observer).
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.snapshot.clone()
    }
}

/// Start a session store task and return a handle to it.
///
/// The task stops once every handle is dropped.
pub fn spawn_store() -> StoreHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
    let (snapshot_tx, snapshot_rx) = watch::channel(SessionState::default());

    tokio::spawn(async move {
        let mut state = SessionState::default();
        while let Some(action) = rx.recv().await {
            state = reduce(state, action);
            if snapshot_tx.send(state.clone()).is_err() {
                break;
            }
        }
        tracing::debug!("Session store task stopped");
    });

    StoreHandle {
        tx,
        snapshot: snapshot_rx,
    }
}
