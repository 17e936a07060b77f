// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wire types as the GraphQL API serves them.
//!
//! These mirror the server schema (Mongo-style `_id`, camelCase fields,
//! nested `author` objects) and are distinct from the server's storage
//! models on purpose: the client only ever sees the wire shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::models::Location;

/// A user profile as returned by `me` and embedded `author` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// A pin as returned by `getPins`, mutations, and subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub image: String,
    pub content: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Pin {
    pub fn location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A comment embedded in its pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub author: Option<User>,
}
