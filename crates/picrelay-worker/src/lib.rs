//! Picrelay worker library.
//!
//! The always-on worker that turns one database change notification into one
//! durably stored, human-readably named image: listen, enrich, derive, fetch,
//! upload. The binary in `main.rs` wires these modules to the process
//! environment.

pub mod fetcher;
pub mod handler;
pub mod listener;
pub mod setup;
pub mod telemetry;

pub use fetcher::{FetchError, ImageFetcher};
pub use handler::EventHandler;
pub use listener::EventListener;
