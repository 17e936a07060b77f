// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Subscription resolvers.
//!
//! Each resolver subscribes to the pin event topic and re-emits the pins
//! from matching events. A subscriber that lags past the channel capacity
//! skips the lost events and keeps going.

use crate::graphql::events::{PinEvent, PinEventBus};
use crate::graphql::types::PinObject;
use crate::models::Pin;
use async_graphql::{Context, Subscription};
use futures_util::Stream;
use tokio::sync::broadcast;

pub struct SubscriptionRoot;

fn pin_stream(
    bus: &PinEventBus,
    filter: fn(PinEvent) -> Option<Pin>,
) -> impl Stream<Item = PinObject> {
    let mut rx = bus.subscribe();
    async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(pin) = filter(event) {
                        yield PinObject(pin);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Pin subscription lagged; events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

#[Subscription]
impl SubscriptionRoot {
    /// Fires for every newly created pin.
    async fn pin_added(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<impl Stream<Item = PinObject>> {
        let bus = ctx.data::<PinEventBus>()?;
        Ok(pin_stream(bus, |event| match event {
            PinEvent::Added(pin) => Some(pin),
            _ => None,
        }))
    }

    /// Fires for every deleted pin, carrying its last state.
    async fn pin_deleted(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<impl Stream<Item = PinObject>> {
        let bus = ctx.data::<PinEventBus>()?;
        Ok(pin_stream(bus, |event| match event {
            PinEvent::Deleted(pin) => Some(pin),
            _ => None,
        }))
    }

    /// Fires whenever a pin changes (a comment was added), carrying the
    /// whole updated pin.
    async fn pin_updated(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<impl Stream<Item = PinObject>> {
        let bus = ctx.data::<PinEventBus>()?;
        Ok(pin_stream(bus, |event| match event {
            PinEvent::Updated(pin) => Some(pin),
            _ => None,
        }))
    }
}
