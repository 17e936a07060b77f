// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod pin;
pub mod user;

pub use pin::{Comment, Location, Pin};
pub use user::User;
