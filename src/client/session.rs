// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session orchestration: API calls folded into the store.
//!
//! Each method performs one server round trip and dispatches the matching
//! action. Failures are logged and leave the state unchanged, except for
//! `login`, which explicitly records the signed-out outcome.

use crate::client::api::{ClientError, PindropClient, PinSubmission};
use crate::client::state::Action;
use crate::client::store::StoreHandle;

/// A signed-in (or anonymous) session against one server.
#[derive(Clone)]
pub struct Session {
    client: PindropClient,
    store: StoreHandle,
}

impl Session {
    pub fn new(client: PindropClient, store: StoreHandle) -> Self {
        Self { client, store }
    }

    /// Resolve the current identity and record it.
    ///
    /// `signed_in` is the provider's own session flag; it is stored verbatim
    /// so the UI reflects the provider even while the profile loads. Any
    /// failure (network, rejected token, anonymous `me`) records a
    /// signed-out session.
    pub async fn login(&self, signed_in: bool) {
        match self.client.me().await {
            Ok(Some(user)) => {
                tracing::debug!(user_id = %user.id, "Login resolved");
                self.store.dispatch(Action::LoginUser(user));
                self.store.dispatch(Action::SetLoggedIn(signed_in));
            }
            Ok(None) => {
                tracing::debug!("Login resolved as anonymous");
                self.store.dispatch(Action::SetLoggedIn(false));
            }
            Err(e) => {
                tracing::error!(error = %e, "Login failed");
                self.store.dispatch(Action::SetLoggedIn(false));
            }
        }
    }

    /// Clear the local session. Purely local; Google sign-out is the
    /// provider widget's job.
    pub fn sign_out(&self) {
        self.store.dispatch(Action::SignoutUser);
    }

    /// Fetch all pins and replace the local list.
    pub async fn load_pins(&self) {
        match self.client.get_pins().await {
            Ok(pins) => self.store.dispatch(Action::GetPins(pins)),
            Err(e) => tracing::error!(error = %e, "Failed to load pins"),
        }
    }

    /// Submit a completed draft. On success the reducer appends the pin and
    /// clears the draft; the subscription echo folds in idempotently.
    pub async fn submit_pin(&self, submission: PinSubmission) -> Result<(), ClientError> {
        match self.client.create_pin(submission).await {
            Ok(pin) => {
                tracing::debug!(pin_id = %pin.id, "Pin created");
                self.store.dispatch(Action::CreatePin(pin));
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create pin");
                Err(e)
            }
        }
    }

    /// Delete a pin. Applied locally on success; the broadcast echo is a
    /// no-op by then.
    pub async fn delete_pin(&self, pin_id: &str) -> Result<(), ClientError> {
        match self.client.delete_pin(pin_id).await {
            Ok(pin) => {
                self.store.dispatch(Action::DeletePin(pin.id));
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, pin_id, "Failed to delete pin");
                Err(e)
            }
        }
    }

    /// Add a comment to a pin and fold the updated pin into the list.
    pub async fn submit_comment(&self, pin_id: &str, text: &str) -> Result<(), ClientError> {
        match self.client.create_comment(pin_id, text).await {
            Ok(pin) => {
                self.store.dispatch(Action::CreateComment(pin));
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, pin_id, "Failed to create comment");
                Err(e)
            }
        }
    }

    /// Abandon the in-progress draft.
    pub fn discard_draft(&self) {
        self.store.dispatch(Action::DiscardDraft);
    }
}
