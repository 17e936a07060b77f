// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GraphQL wire types.
//!
//! Thin wrappers over the storage models that expose the wire schema the
//! web client expects: Mongo-style `_id` field names, an `author` object
//! resolved from `author_id`, and a derived `pins` id list on `User`.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{Comment, Pin, User};
use async_graphql::dataloader::{DataLoader, Loader};
use async_graphql::{Context, ErrorExtensions, InputObject, Object, ID};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

/// Batched user lookup for `author` fields.
pub struct UserLoader {
    pub db: FirestoreDb,
}

impl Loader<String> for UserLoader {
    type Value = User;
    type Error = Arc<AppError>;

    async fn load(&self, keys: &[String]) -> Result<HashMap<String, User>, Self::Error> {
        let users = self.db.get_users(keys).await.map_err(Arc::new)?;
        Ok(users.into_iter().map(|user| (user.id.clone(), user)).collect())
    }
}

async fn load_author(ctx: &Context<'_>, author_id: &str) -> async_graphql::Result<Option<UserObject>> {
    let loader = ctx.data::<DataLoader<UserLoader>>()?;
    let user = loader.load_one(author_id.to_string()).await?;
    Ok(user.map(UserObject))
}

/// `User` as seen on the wire.
pub struct UserObject(pub User);

#[Object(name = "User")]
impl UserObject {
    #[graphql(name = "_id")]
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn email(&self) -> Option<&str> {
        self.0.email.as_deref()
    }

    async fn picture(&self) -> Option<&str> {
        self.0.picture.as_deref()
    }

    /// Ids of the pins this user created, oldest first.
    async fn pins(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<ID>> {
        let db = ctx.data::<FirestoreDb>()?;
        let ids = db
            .pin_ids_for_author(&self.0.id)
            .await
            .map_err(|e| e.extend())?;
        Ok(ids.into_iter().map(ID).collect())
    }
}

/// `Comment` as seen on the wire.
pub struct CommentObject(pub Comment);

#[Object(name = "Comment")]
impl CommentObject {
    async fn text(&self) -> &str {
        &self.0.text
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn author(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<UserObject>> {
        load_author(ctx, &self.0.author_id).await
    }
}

/// `Pin` as seen on the wire.
pub struct PinObject(pub Pin);

#[Object(name = "Pin")]
impl PinObject {
    #[graphql(name = "_id")]
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn image(&self) -> &str {
        &self.0.image
    }

    async fn content(&self) -> &str {
        &self.0.content
    }

    async fn latitude(&self) -> f64 {
        self.0.latitude
    }

    async fn longitude(&self) -> f64 {
        self.0.longitude
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn author(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<UserObject>> {
        load_author(ctx, &self.0.author_id).await
    }

    async fn comments(&self) -> Vec<CommentObject> {
        self.0.comments.iter().cloned().map(CommentObject).collect()
    }
}

/// Input for `createPin`.
#[derive(Debug, InputObject, Validate)]
pub struct CreatePinInput {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(url)]
    pub image: String,
    #[validate(length(max = 2000))]
    pub content: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}
