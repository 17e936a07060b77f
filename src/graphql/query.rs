// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Query resolvers.

use crate::db::FirestoreDb;
use crate::graphql::types::{PinObject, UserObject};
use crate::middleware::auth::CurrentUser;
use async_graphql::{Context, ErrorExtensions, Object};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The signed-in user, or null for anonymous requests.
    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<UserObject>> {
        let CurrentUser(user) = ctx.data::<CurrentUser>()?;
        Ok(user.clone().map(UserObject))
    }

    /// Every pin on the map, oldest first.
    async fn get_pins(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<PinObject>> {
        let db = ctx.data::<FirestoreDb>()?;
        let pins = db.list_pins().await.map_err(|e| e.extend())?;
        Ok(pins.into_iter().map(PinObject).collect())
    }
}
