// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Pin and comment models for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees, south negative
    pub latitude: f64,
    /// Longitude in degrees, west negative
    pub longitude: f64,
}

/// Stored pin record in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// Pin ID (UUID v4, also used as document ID)
    pub id: String,
    /// Pin title
    pub title: String,
    /// Image URL
    pub image: String,
    /// Free-form description
    pub content: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Google subject of the pin's author
    pub author_id: String,
    /// When the pin was created
    pub created_at: DateTime<Utc>,
    /// Comments in append order
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Pin {
    /// Pin location as a point.
    pub fn location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Comment embedded in its pin document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment text
    pub text: String,
    /// Google subject of the comment's author
    pub author_id: String,
    /// When the comment was posted
    pub created_at: DateTime<Utc>,
}
