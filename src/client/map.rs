// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map interaction logic, renderer-agnostic.
//!
//! The actual tile rendering and gesture recognition live in the UI shell;
//! this module turns decoded input events into store actions and projects
//! the session state into the marker list the renderer draws.

use crate::client::state::{Action, SessionState};
use crate::client::store::StoreHandle;
use crate::client::types::{Location, Pin};
use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};

/// Pins at most this many minutes old (inclusive) render highlighted.
pub const NEW_PIN_WINDOW_MINUTES: i64 = 30;

/// Map camera state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    /// Downtown San Francisco until a geolocation fix arrives.
    fn default() -> Self {
        Self {
            latitude: 37.7577,
            longitude: -122.4376,
            zoom: 13.0,
        }
    }
}

/// Which pointer button produced a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

/// Presentation age class of a pin marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerAge {
    New,
    Established,
}

/// Classify a pin's age at render time.
///
/// The window is inclusive: exactly 30 minutes old is still `New`. Whole
/// minutes are compared, so 30m59s truncates to 30 and stays `New`.
pub fn classify_pin_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> MarkerAge {
    if now.signed_duration_since(created_at).num_minutes() <= NEW_PIN_WINDOW_MINUTES {
        MarkerAge::New
    } else {
        MarkerAge::Established
    }
}

/// What a marker stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerKind {
    UserPosition,
    Draft,
    Pin { id: String, age: MarkerAge },
}

/// A positioned marker for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub location: Location,
    pub kind: MarkerKind,
}

impl Marker {
    /// Marker color by kind and age.
    pub fn color(&self) -> &'static str {
        match &self.kind {
            MarkerKind::UserPosition => "red",
            MarkerKind::Draft => "hotpink",
            MarkerKind::Pin {
                age: MarkerAge::New,
                ..
            } => "limegreen",
            MarkerKind::Pin {
                age: MarkerAge::Established,
                ..
            } => "darkblue",
        }
    }
}

/// Whether the delete control should appear for the selected pin.
///
/// Display-only: the server refuses non-owner deletes regardless.
pub fn can_delete(state: &SessionState) -> bool {
    match (&state.current_user, &state.current_pin) {
        (Some(user), Some(pin)) => pin
            .author
            .as_ref()
            .is_some_and(|author| author.id == user.id),
        _ => false,
    }
}

/// Popup caption for a selected pin's coordinates.
pub fn popup_caption(pin: &Pin) -> String {
    format!("{:.6}, {:.6}", pin.latitude, pin.longitude)
}

/// A decoded subscription event, ready to fold into the store.
#[derive(Debug, Clone)]
pub enum LiveUpdate {
    PinAdded(Pin),
    PinDeleted(Pin),
    PinUpdated(Pin),
}

/// Fold one live update into the store.
pub fn fold_live_update(store: &StoreHandle, update: LiveUpdate) {
    match update {
        LiveUpdate::PinAdded(pin) => store.dispatch(Action::CreatePin(pin)),
        LiveUpdate::PinDeleted(pin) => store.dispatch(Action::DeletePin(pin.id)),
        LiveUpdate::PinUpdated(pin) => store.dispatch(Action::CreateComment(pin)),
    }
}

/// Drive a live-update stream into the store until it ends.
pub async fn run_live_updates<S>(store: StoreHandle, mut updates: S)
where
    S: Stream<Item = LiveUpdate> + Unpin,
{
    while let Some(update) = updates.next().await {
        fold_live_update(&store, update);
    }
    tracing::debug!("Live update stream ended");
}

/// The map view core: camera, user position, and input handling.
pub struct MapView {
    store: StoreHandle,
    pub viewport: Viewport,
    user_position: Option<Location>,
}

impl MapView {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            store,
            viewport: Viewport::default(),
            user_position: None,
        }
    }

    /// Apply a one-shot geolocation fix: recenter (keeping zoom) and place
    /// the user-position marker.
    pub fn set_user_position(&mut self, location: Location) {
        self.viewport.latitude = location.latitude;
        self.viewport.longitude = location.longitude;
        self.user_position = Some(location);
    }

    /// Handle a map click.
    ///
    /// A primary-button click starts a draft if none exists and moves the
    /// draft to the clicked location. Other buttons do nothing.
    pub fn handle_click(&self, button: PointerButton, location: Location) {
        if button != PointerButton::Primary {
            return;
        }

        if self.store.state().draft.is_none() {
            self.store.dispatch(Action::CreateDraft);
        }

        self.store.dispatch(Action::UpdateDraftLocation(location));
    }

    /// Handle a click on a pin marker: select it (the popup follows).
    pub fn select_pin(&self, pin: Pin) {
        self.store.dispatch(Action::SetPin(pin));
    }

    /// Project the session state into the marker list for the renderer.
    ///
    /// Order matches draw order: user position, draft, then pins.
    pub fn markers(&self, state: &SessionState, now: DateTime<Utc>) -> Vec<Marker> {
        let mut markers = Vec::new();

        if let Some(position) = self.user_position {
            markers.push(Marker {
                location: position,
                kind: MarkerKind::UserPosition,
            });
        }

        if let Some(draft) = &state.draft {
            if let Some(location) = draft.location {
                markers.push(Marker {
                    location,
                    kind: MarkerKind::Draft,
                });
            }
        }

        for pin in &state.pins {
            markers.push(Marker {
                location: pin.location(),
                kind: MarkerKind::Pin {
                    id: pin.id.clone(),
                    age: classify_pin_age(pin.created_at, now),
                },
            });
        }

        markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::state::SessionState;
    use crate::client::store::spawn_store;
    use crate::client::types::User;
    use chrono::Duration;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            name: id.to_string(),
            email: None,
            picture: None,
        }
    }

    fn pin_by(id: &str, author: &str) -> Pin {
        Pin {
            id: id.to_string(),
            title: "t".to_string(),
            image: "https://example.com/a.jpg".to_string(),
            content: String::new(),
            latitude: 10.0,
            longitude: 20.0,
            created_at: Utc::now(),
            author: Some(user(author)),
            comments: vec![],
        }
    }

    #[test]
    fn age_classification_boundaries() {
        let now = Utc::now();

        let t29 = now - Duration::minutes(29);
        let t30 = now - Duration::minutes(30);
        let t31 = now - Duration::minutes(31);

        assert_eq!(classify_pin_age(t29, now), MarkerAge::New);
        assert_eq!(classify_pin_age(t30, now), MarkerAge::New);
        assert_eq!(classify_pin_age(t31, now), MarkerAge::Established);

        // Sub-minute leftovers truncate: 30m30s is still inside the window.
        let t30_and_a_bit = now - Duration::minutes(30) - Duration::seconds(30);
        assert_eq!(classify_pin_age(t30_and_a_bit, now), MarkerAge::New);
    }

    #[test]
    fn marker_colors_follow_kind_and_age() {
        let loc = Location {
            latitude: 0.0,
            longitude: 0.0,
        };

        let user_marker = Marker {
            location: loc,
            kind: MarkerKind::UserPosition,
        };
        let draft_marker = Marker {
            location: loc,
            kind: MarkerKind::Draft,
        };
        let new_marker = Marker {
            location: loc,
            kind: MarkerKind::Pin {
                id: "p".to_string(),
                age: MarkerAge::New,
            },
        };
        let old_marker = Marker {
            location: loc,
            kind: MarkerKind::Pin {
                id: "p".to_string(),
                age: MarkerAge::Established,
            },
        };

        assert_eq!(user_marker.color(), "red");
        assert_eq!(draft_marker.color(), "hotpink");
        assert_eq!(new_marker.color(), "limegreen");
        assert_eq!(old_marker.color(), "darkblue");
    }

    #[test]
    fn delete_guard_requires_ownership() {
        let mut state = SessionState {
            current_user: Some(user("u1")),
            current_pin: Some(pin_by("p1", "u2")),
            ..SessionState::default()
        };
        assert!(!can_delete(&state));

        state.current_pin = Some(pin_by("p1", "u1"));
        assert!(can_delete(&state));

        state.current_user = None;
        assert!(!can_delete(&state));
    }

    #[test]
    fn popup_caption_uses_six_decimals() {
        let pin = Pin {
            latitude: 37.75771234567,
            longitude: -122.43761234567,
            ..pin_by("p1", "u1")
        };
        assert_eq!(popup_caption(&pin), "37.757712, -122.437612");
    }

    #[tokio::test]
    async fn primary_click_creates_then_moves_draft() {
        let store = spawn_store();
        let view = MapView::new(store.clone());

        view.handle_click(
            PointerButton::Primary,
            Location {
                latitude: 1.0,
                longitude: 2.0,
            },
        );

        let mut watcher = store.watch();
        let state = watcher
            .wait_for(|state| {
                state
                    .draft
                    .as_ref()
                    .is_some_and(|draft| draft.location.is_some())
            })
            .await
            .expect("store alive");

        let location = state.draft.as_ref().and_then(|d| d.location);
        assert_eq!(
            location,
            Some(Location {
                latitude: 1.0,
                longitude: 2.0
            })
        );
    }

    #[tokio::test]
    async fn second_click_only_moves_the_draft() {
        let store = spawn_store();
        let view = MapView::new(store.clone());

        view.handle_click(
            PointerButton::Primary,
            Location {
                latitude: 1.0,
                longitude: 2.0,
            },
        );

        let mut watcher = store.watch();
        watcher
            .wait_for(|state| state.draft.is_some())
            .await
            .expect("store alive");

        view.handle_click(
            PointerButton::Primary,
            Location {
                latitude: 3.0,
                longitude: 4.0,
            },
        );

        let state = watcher
            .wait_for(|state| {
                state
                    .draft
                    .as_ref()
                    .and_then(|d| d.location)
                    .is_some_and(|l| l.latitude == 3.0)
            })
            .await
            .expect("store alive");

        assert_eq!(
            state.draft.as_ref().and_then(|d| d.location),
            Some(Location {
                latitude: 3.0,
                longitude: 4.0
            })
        );
    }

    #[tokio::test]
    async fn non_primary_clicks_are_ignored() {
        let store = spawn_store();
        let view = MapView::new(store.clone());

        view.handle_click(
            PointerButton::Secondary,
            Location {
                latitude: 1.0,
                longitude: 2.0,
            },
        );
        view.handle_click(
            PointerButton::Auxiliary,
            Location {
                latitude: 1.0,
                longitude: 2.0,
            },
        );

        // Force a round trip through the fold task so any click dispatches
        // would have been applied by now.
        store.dispatch(Action::SetLoggedIn(true));
        let mut watcher = store.watch();
        let state = watcher
            .wait_for(|state| state.logged_in)
            .await
            .expect("store alive");

        assert!(state.draft.is_none());
    }

    #[tokio::test]
    async fn geolocation_fix_recenters_and_adds_marker() {
        let store = spawn_store();
        let mut view = MapView::new(store.clone());
        assert_eq!(view.viewport, Viewport::default());

        view.set_user_position(Location {
            latitude: 51.5,
            longitude: -0.1,
        });

        assert_eq!(view.viewport.latitude, 51.5);
        assert_eq!(view.viewport.longitude, -0.1);
        assert_eq!(view.viewport.zoom, Viewport::default().zoom);

        let markers = view.markers(&store.state(), Utc::now());
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].kind, MarkerKind::UserPosition);
    }

    #[tokio::test]
    async fn markers_cover_draft_and_pins() {
        let store = spawn_store();
        let view = MapView::new(store.clone());

        store.dispatch(Action::GetPins(vec![pin_by("p1", "u1")]));
        store.dispatch(Action::CreateDraft);
        store.dispatch(Action::UpdateDraftLocation(Location {
            latitude: 5.0,
            longitude: 6.0,
        }));

        let mut watcher = store.watch();
        let state = watcher
            .wait_for(|state| {
                !state.pins.is_empty()
                    && state.draft.as_ref().is_some_and(|d| d.location.is_some())
            })
            .await
            .expect("store alive");

        let markers = view.markers(&state, Utc::now());
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].kind, MarkerKind::Draft);
        assert!(matches!(markers[1].kind, MarkerKind::Pin { .. }));
    }
}
