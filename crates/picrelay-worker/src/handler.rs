//! Per-event orchestration.
//!
//! One handler run per change notification: extract the original token, look
//! up session metadata, derive the filename, fetch the bytes, upload. Every
//! failure is absorbed here; nothing escapes to the dispatch loop, so a bad
//! event can never tear down the shared subscription.

use std::sync::Arc;

use picrelay_core::naming::{self, FALLBACK_FILENAME};
use picrelay_core::ChangeEvent;
use picrelay_db::SessionLookup;
use picrelay_storage::Storage;

use crate::fetcher::ImageFetcher;

pub struct EventHandler {
    lookup: Arc<dyn SessionLookup>,
    fetcher: ImageFetcher,
    storage: Arc<dyn Storage>,
    dest_folder: String,
}

impl EventHandler {
    pub fn new(
        lookup: Arc<dyn SessionLookup>,
        fetcher: ImageFetcher,
        storage: Arc<dyn Storage>,
        dest_folder: String,
    ) -> Self {
        Self {
            lookup,
            fetcher,
            storage,
            dest_folder,
        }
    }

    /// Process one event end to end. Fire-and-forget: failures are logged and
    /// the event is dropped, leaving other in-flight runs untouched.
    #[tracing::instrument(skip(self, event), fields(path = %event.payload))]
    pub async fn handle(&self, event: ChangeEvent) {
        let token = naming::original_token(&event.payload).unwrap_or(FALLBACK_FILENAME);
        tracing::info!(channel = %event.channel, token = %token, "Processing image event");

        // Lookup failures are already absorbed into None; the fallback to the
        // original token is one code path, not three.
        let session = self.lookup.lookup(&event.payload).await;

        let mut filename = naming::derive_now(token, session.as_ref());
        if filename.is_empty() {
            filename = FALLBACK_FILENAME.to_string();
        }
        tracing::debug!(
            filename = %filename,
            enriched = session.is_some(),
            "Derived filename"
        );

        let bytes = match self.fetcher.fetch(&event.payload).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "Image fetch failed, dropping event");
                return;
            }
        };

        match self
            .storage
            .upload(&self.dest_folder, &filename, bytes.to_vec())
            .await
        {
            Ok(object_id) => {
                tracing::info!(filename = %filename, object_id = %object_id, "Image uploaded");
            }
            Err(e) => {
                tracing::error!(error = %e, filename = %filename, "Upload failed, dropping event");
            }
        }
    }
}
