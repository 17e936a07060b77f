// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mutation resolvers.
//!
//! Every mutation requires a signed-in user, writes to Firestore, and
//! publishes the change on the pin event topic so open subscriptions see it.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::graphql::events::{PinEvent, PinEventBus};
use crate::graphql::types::{CreatePinInput, PinObject};
use crate::middleware::auth::CurrentUser;
use crate::models::{Comment, Pin, User};
use async_graphql::{Context, ErrorExtensions, Object, ID};
use validator::Validate;

const MAX_COMMENT_LENGTH: usize = 500;

pub struct MutationRoot;

/// The signed-in user, or an UNAUTHENTICATED error.
fn require_user(ctx: &Context<'_>) -> async_graphql::Result<User> {
    match ctx.data::<CurrentUser>() {
        Ok(CurrentUser(Some(user))) => Ok(user.clone()),
        _ => Err(AppError::Unauthenticated.extend()),
    }
}

#[Object]
impl MutationRoot {
    /// Create a pin owned by the signed-in user.
    async fn create_pin(
        &self,
        ctx: &Context<'_>,
        input: CreatePinInput,
    ) -> async_graphql::Result<PinObject> {
        let user = require_user(ctx)?;

        input
            .validate()
            .map_err(AppError::from)
            .map_err(|e| e.extend())?;

        let pin = Pin {
            id: uuid::Uuid::new_v4().to_string(),
            title: input.title,
            image: input.image,
            content: input.content,
            latitude: input.latitude,
            longitude: input.longitude,
            author_id: user.id,
            created_at: chrono::Utc::now(),
            comments: vec![],
        };

        let db = ctx.data::<FirestoreDb>()?;
        db.create_pin(&pin).await.map_err(|e| e.extend())?;

        ctx.data::<PinEventBus>()?
            .publish(PinEvent::Added(pin.clone()));

        tracing::info!(pin_id = %pin.id, author_id = %pin.author_id, "Pin created");

        Ok(PinObject(pin))
    }

    /// Delete a pin. Only the pin's author may delete it.
    async fn delete_pin(&self, ctx: &Context<'_>, pin_id: ID) -> async_graphql::Result<PinObject> {
        let user = require_user(ctx)?;
        let db = ctx.data::<FirestoreDb>()?;

        let pin = db
            .get_pin(&pin_id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::NotFound(format!("pin {}", *pin_id)).extend())?;

        if pin.author_id != user.id {
            tracing::warn!(
                pin_id = %pin.id,
                author_id = %pin.author_id,
                requester = %user.id,
                "Refused delete of another user's pin"
            );
            return Err(AppError::Forbidden.extend());
        }

        db.delete_pin(&pin.id).await.map_err(|e| e.extend())?;

        ctx.data::<PinEventBus>()?
            .publish(PinEvent::Deleted(pin.clone()));

        tracing::info!(pin_id = %pin.id, author_id = %pin.author_id, "Pin deleted");

        Ok(PinObject(pin))
    }

    /// Append a comment to a pin and return the updated pin.
    async fn create_comment(
        &self,
        ctx: &Context<'_>,
        pin_id: ID,
        text: String,
    ) -> async_graphql::Result<PinObject> {
        let user = require_user(ctx)?;

        let text = text.trim().to_string();
        if text.is_empty() || text.len() > MAX_COMMENT_LENGTH {
            return Err(AppError::BadRequest(format!(
                "comment text must be 1 to {} characters",
                MAX_COMMENT_LENGTH
            ))
            .extend());
        }

        let comment = Comment {
            text,
            author_id: user.id,
            created_at: chrono::Utc::now(),
        };

        let db = ctx.data::<FirestoreDb>()?;
        let pin = db
            .add_comment(&pin_id, comment)
            .await
            .map_err(|e| e.extend())?;

        ctx.data::<PinEventBus>()?
            .publish(PinEvent::Updated(pin.clone()));

        tracing::info!(
            pin_id = %pin.id,
            comments = pin.comments.len(),
            "Comment created"
        );

        Ok(PinObject(pin))
    }
}
