//! Subscription bootstrap: the LISTEN/NOTIFY dispatch loop.
//!
//! One `PgListener` for the process lifetime. Each notification is dispatched
//! onto its own task so slow runs never block delivery of the next event;
//! runs share no mutable state and may overlap freely.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgListener;
use sqlx::PgPool;

use picrelay_core::ChangeEvent;

use crate::handler::EventHandler;

pub struct EventListener {
    listener: PgListener,
    channel: String,
}

impl EventListener {
    /// Connect and register the channel. Failure here is fatal to the
    /// process; the worker has no purpose without its subscription.
    pub async fn connect(pool: &PgPool, channel: &str) -> Result<Self> {
        let mut listener = PgListener::connect_with(pool)
            .await
            .context("Failed to open notification connection")?;
        listener
            .listen(channel)
            .await
            .with_context(|| format!("Failed to LISTEN on channel {}", channel))?;
        tracing::info!(channel = %channel, "Notification subscription established");

        Ok(Self {
            listener,
            channel: channel.to_string(),
        })
    }

    /// Run the dispatch loop forever. Receive errors are logged and the loop
    /// continues; `PgListener` re-establishes its connection on the next
    /// receive.
    pub async fn run(mut self, handler: Arc<EventHandler>) {
        tracing::info!(channel = %self.channel, "Listening for image events");
        loop {
            match self.listener.recv().await {
                Ok(notification) => {
                    let payload = notification.payload();
                    if payload.is_empty() {
                        tracing::warn!(channel = %notification.channel(), "Empty payload, skipping event");
                        continue;
                    }
                    let event = ChangeEvent::new(notification.channel(), payload);
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        handler.handle(event).await;
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Notification stream error, reconnecting");
                }
            }
        }
    }
}
