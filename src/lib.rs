// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Pindrop: share geotagged pins on a live map
//!
//! This crate provides the GraphQL backend for creating, deleting, and
//! commenting on map pins, plus the client-side session core (state store,
//! reducer, map interaction) used by the map UI shell.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use graphql::{PindropSchema, PinEventBus};
use services::IdentityService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub identity: IdentityService,
    pub events: PinEventBus,
    pub schema: PindropSchema,
}
