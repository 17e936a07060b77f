// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed Firestore access.
//!
//! Two collections back the whole app: `users` keyed by Google subject,
//! and `pins` keyed by pin id with comments embedded in the document.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Comment, Pin, User};
use futures_util::{stream, FutureExt, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database handle; `None` inside means the offline test stub.
#[derive(Clone)]
pub struct FirestoreDb {
    inner: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Connect to Firestore, or to the emulator when
    /// FIRESTORE_EMULATOR_HOST is set.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        let inner = match std::env::var("FIRESTORE_EMULATOR_HOST") {
            Ok(host) => Self::connect_emulator(project_id, &host).await?,
            Err(_) => firestore::FirestoreDb::new(project_id).await.map_err(|e| {
                AppError::Database(format!("Failed to connect to Firestore: {}", e))
            })?,
        };

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { inner: Some(inner) })
    }

    /// The emulator ignores credentials, but the client still insists on a
    /// token source; hand it an unsigned throwaway JWT.
    async fn connect_emulator(
        project_id: &str,
        host: &str,
    ) -> Result<firestore::FirestoreDb, AppError> {
        tracing::debug!(host, "Connecting to the Firestore emulator unauthenticated");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        firestore::FirestoreDb::with_options_token_source(
            firestore::FirestoreDbOptions::new(project_id.to_string()),
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to connect to the emulator: {}", e)))
    }

    /// An offline handle whose every operation fails with a database error.
    /// Lets router and schema tests run without an emulator.
    pub fn new_mock() -> Self {
        Self { inner: None }
    }

    fn client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.inner
            .as_ref()
            .ok_or_else(|| AppError::Database("database is offline (mock handle)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their Google subject.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get several users at once, for batched author resolution.
    ///
    /// Missing ids are simply absent from the result. Lookups fan out
    /// concurrently, capped at `MAX_CONCURRENT_DB_OPS` in flight.
    pub async fn get_users(&self, user_ids: &[String]) -> Result<Vec<User>, AppError> {
        let client = self.client()?;

        let results = stream::iter(user_ids.to_vec())
            .map(|user_id| async move {
                client
                    .fluent()
                    .select()
                    .by_id_in(collections::USERS)
                    .obj::<User>()
                    .one(&user_id)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Option<User>, AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<Option<User>>, AppError>>()?;

        Ok(results.into_iter().flatten().collect())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Pin Operations ──────────────────────────────────────────

    /// Get a pin by ID.
    pub async fn get_pin(&self, pin_id: &str) -> Result<Option<Pin>, AppError> {
        self.client()?
            .fluent()
            .select()
            .by_id_in(collections::PINS)
            .obj()
            .one(pin_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all pins, oldest first.
    pub async fn list_pins(&self) -> Result<Vec<Pin>, AppError> {
        self.client()?
            .fluent()
            .select()
            .from(collections::PINS)
            .order_by([("created_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the ids of all pins created by one author, oldest first.
    pub async fn pin_ids_for_author(&self, author_id: &str) -> Result<Vec<String>, AppError> {
        let author_id = author_id.to_string();
        let pins: Vec<Pin> = self
            .client()?
            .fluent()
            .select()
            .from(collections::PINS)
            .filter(move |q| q.for_all([q.field("author_id").eq(author_id.clone())]))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(pins.into_iter().map(|pin| pin.id).collect())
    }

    /// Store a new pin.
    pub async fn create_pin(&self, pin: &Pin) -> Result<(), AppError> {
        let _: () = self
            .client()?
            .fluent()
            .update()
            .in_col(collections::PINS)
            .document_id(&pin.id)
            .object(pin)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a pin by ID.
    pub async fn delete_pin(&self, pin_id: &str) -> Result<(), AppError> {
        self.client()?
            .fluent()
            .delete()
            .from(collections::PINS)
            .document_id(pin_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Atomic Comment Append ───────────────────────────────────

    /// Append a comment to a pin and return the updated pin.
    ///
    /// Runs as a Firestore transaction with the read bound to it, so two
    /// concurrent comments on the same pin cannot drop each other: the
    /// losing transaction is retried against the fresh document.
    pub async fn add_comment(&self, pin_id: &str, comment: Comment) -> Result<Pin, AppError> {
        let client = self.client()?.clone();
        let pin_id = pin_id.to_string();

        let updated: Option<Pin> = client
            .run_transaction(|db, transaction| {
                let pin_id = pin_id.clone();
                let comment = comment.clone();
                async move {
                    // The db handle here reads with transaction consistency.
                    let current: Option<Pin> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::PINS)
                        .obj()
                        .one(&pin_id)
                        .await?;

                    let Some(mut pin) = current else {
                        return Ok(None);
                    };

                    pin.comments.push(comment);

                    db.fluent()
                        .update()
                        .in_col(collections::PINS)
                        .document_id(&pin.id)
                        .object(&pin)
                        .add_to_transaction(transaction)?;

                    Ok(Some(pin))
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Comment transaction failed: {}", e)))?;

        let pin = updated.ok_or_else(|| AppError::NotFound(format!("pin {}", pin_id)))?;

        tracing::debug!(pin_id = %pin.id, comments = pin.comments.len(), "Comment appended");

        Ok(pin)
    }
}
