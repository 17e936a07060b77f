// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session state and the reducer that advances it.
//!
//! All session state lives in one [`SessionState`] value advanced only by
//! [`reduce`], a pure function over a closed [`Action`] enum. The match is
//! exhaustive, so an unhandled action is a compile error rather than a
//! runtime surprise.
//!
//! The reducer is where live-update folding converges: `CreatePin` replaces
//! any same-id pin before appending and `DeletePin` ignores absent ids, so
//! a mutation response and its subscription echo can arrive in either
//! order, or twice, without corrupting the collection.

use crate::client::types::{Location, Pin, User};

/// A pin being composed, before submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    /// Where the pin will go; set by the first map click.
    pub location: Option<Location>,
}

/// The whole client session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// The signed-in user, if any
    pub current_user: Option<User>,
    /// Whether sign-in completed
    pub logged_in: bool,
    /// Client mirror of the shared pin collection
    pub pins: Vec<Pin>,
    /// Pin being composed, if any
    pub draft: Option<Draft>,
    /// Selected pin; the popup shows exactly this
    pub current_pin: Option<Pin>,
}

/// Everything that can happen to the session.
#[derive(Debug, Clone)]
pub enum Action {
    /// Record the signed-in user's profile
    LoginUser(User),
    /// Record whether sign-in completed
    SetLoggedIn(bool),
    /// Drop user, login flag, draft, and selection (pins stay)
    SignoutUser,
    /// Replace the whole pin collection with a fetch result
    GetPins(Vec<Pin>),
    /// Begin composing a pin; dismisses any open popup
    CreateDraft,
    /// Move the draft to a location; ignored when no draft exists
    UpdateDraftLocation(Location),
    /// Add a created pin, replacing any same-id pin; ends the draft
    CreatePin(Pin),
    /// Select a pin (opens its popup); ends the draft
    SetPin(Pin),
    /// Remove a pin by id; clears a matching selection
    DeletePin(String),
    /// Replace a pin with its commented version
    CreateComment(Pin),
    /// Abandon the draft without submitting
    DiscardDraft,
}

/// Advance the session by one action.
pub fn reduce(state: SessionState, action: Action) -> SessionState {
    match action {
        Action::LoginUser(user) => SessionState {
            current_user: Some(user),
            ..state
        },

        Action::SetLoggedIn(logged_in) => SessionState { logged_in, ..state },

        Action::SignoutUser => SessionState {
            current_user: None,
            logged_in: false,
            draft: None,
            current_pin: None,
            pins: state.pins,
        },

        Action::GetPins(pins) => SessionState { pins, ..state },

        Action::CreateDraft => SessionState {
            draft: Some(Draft::default()),
            current_pin: None,
            ..state
        },

        Action::UpdateDraftLocation(location) => match state.draft {
            Some(_) => SessionState {
                draft: Some(Draft {
                    location: Some(location),
                }),
                ..state
            },
            None => state,
        },

        Action::CreatePin(pin) => {
            let mut pins = state.pins;
            pins.retain(|existing| existing.id != pin.id);
            pins.push(pin);
            SessionState {
                pins,
                draft: None,
                ..state
            }
        }

        Action::SetPin(pin) => SessionState {
            current_pin: Some(pin),
            draft: None,
            ..state
        },

        Action::DeletePin(pin_id) => {
            let mut pins = state.pins;
            pins.retain(|pin| pin.id != pin_id);
            let current_pin = state.current_pin.filter(|pin| pin.id != pin_id);
            SessionState {
                pins,
                current_pin,
                ..state
            }
        }

        Action::CreateComment(updated) => {
            let mut pins = state.pins;
            let mut replaced = false;
            for pin in pins.iter_mut() {
                if pin.id == updated.id {
                    *pin = updated.clone();
                    replaced = true;
                }
            }
            let current_pin = if replaced {
                match state.current_pin {
                    Some(selected) if selected.id == updated.id => Some(updated),
                    other => other,
                }
            } else {
                state.current_pin
            };
            SessionState {
                pins,
                current_pin,
                ..state
            }
        }

        Action::DiscardDraft => SessionState {
            draft: None,
            ..state
        },
    }
}
