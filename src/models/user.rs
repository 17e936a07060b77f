//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Google subject claim (also used as document ID)
    pub id: String,
    /// Display name from the ID token
    pub name: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// Profile picture URL
    pub picture: Option<String>,
    /// When the user first signed in
    pub created_at: DateTime<Utc>,
}
