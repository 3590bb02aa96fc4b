//! Domain models shared across the pipeline.

use serde::Serialize;
use std::fmt;

/// One change notification as delivered by the event source.
///
/// The payload is a forward-slash-delimited path to the newly rendered image
/// (e.g. `/outputs/abc123_final.png`). An event lives only for the duration of
/// a single handler run and is never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub channel: String,
    pub payload: String,
}

impl ChangeEvent {
    pub fn new(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}

/// Session metadata resolved from the database for one event.
///
/// A read-only snapshot fetched per event; never cached across events.
/// `style_tag` holds whichever enrichment column the deployment exposes
/// (see [`crate::config::EnrichmentShape`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    pub session_id: i64,
    pub display_name: Option<String>,
    pub style_tag: Option<String>,
}

/// Coarse classification of an image's purpose, inferred from substrings of
/// the original file token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageKind {
    FinalOutput,
    QrCode,
    Generic,
}

impl ImageKind {
    /// Classify from the (extension-stripped) base of the original token.
    pub fn classify(base: &str) -> Self {
        let lower = base.to_lowercase();
        if lower.contains("final") {
            ImageKind::FinalOutput
        } else if lower.contains("qr") {
            ImageKind::QrCode
        } else {
            ImageKind::Generic
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ImageKind::FinalOutput => "Final Output",
            ImageKind::QrCode => "QR Code",
            ImageKind::Generic => "Generic",
        };
        write!(f, "{}", label)
    }
}
