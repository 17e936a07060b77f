// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GraphQL API: schema assembly and resolvers.
//!
//! The wire schema matches what the web client already speaks:
//!
//! ```graphql
//! query { me { _id name } }
//! query { getPins { _id title latitude longitude comments { text } } }
//! mutation { createPin(input: {...}) { _id } }
//! mutation { deletePin(pinId: "...") { _id } }
//! mutation { createComment(pinId: "...", text: "...") { _id comments { text } } }
//! subscription { pinAdded { _id title } }
//! ```

pub mod events;
pub mod mutation;
pub mod query;
pub mod subscription;
pub mod types;

pub use events::{PinEvent, PinEventBus};
pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use subscription::SubscriptionRoot;

use crate::db::FirestoreDb;
use crate::middleware::auth::CurrentUser;
use async_graphql::dataloader::DataLoader;
use async_graphql::Schema;
use types::UserLoader;

/// The full GraphQL schema type.
pub type PindropSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// Build the GraphQL schema with shared state.
///
/// The per-request `CurrentUser` inserted by the auth middleware overrides
/// the anonymous default registered here, so subscriptions opened without a
/// token still resolve.
pub fn build_schema(db: FirestoreDb, events: PinEventBus) -> PindropSchema {
    Schema::build(QueryRoot, MutationRoot, SubscriptionRoot)
        .data(db.clone())
        .data(events)
        .data(CurrentUser(None))
        .data(DataLoader::new(UserLoader { db }, tokio::spawn))
        .finish()
}
