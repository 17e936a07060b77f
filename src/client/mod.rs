// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side core: session state, the store that serializes updates to
//! it, and the map/API layers a UI shell builds on.
//!
//! The shell owns rendering and input decoding; everything here is plain
//! logic so it can be driven from tests without a display. A typical wiring:
//!
//! ```text
//! let store = spawn_store();
//! let client = PindropClient::new(config.api_url).with_token(id_token);
//! let session = Session::new(client, store.clone());
//! let map = MapView::new(store.clone());
//! ```

pub mod api;
pub mod map;
pub mod session;
pub mod state;
pub mod store;
pub mod types;

pub use api::{ClientError, PinSubmission, PindropClient};
pub use map::{LiveUpdate, MapView, Marker, MarkerAge, MarkerKind, PointerButton, Viewport};
pub use session::Session;
pub use state::{Action, Draft, SessionState};
pub use store::{spawn_store, StoreHandle};
pub use types::{Comment, Location, Pin, User};

use crate::config::ConfigError;

/// Client-side settings, read from the environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// GraphQL endpoint, e.g. `http://localhost:4000/graphql`.
    pub api_url: String,
    /// Access token for the map tile provider.
    pub map_access_token: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("PINDROP_API_URL")
            .unwrap_or_else(|_| "http://localhost:4000/graphql".to_string());

        let map_access_token =
            std::env::var("MAP_ACCESS_TOKEN").map_err(|_| ConfigError::Missing("MAP_ACCESS_TOKEN"))?;

        Ok(Self {
            api_url,
            map_access_token,
        })
    }
}
