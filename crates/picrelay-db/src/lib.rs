//! Picrelay DB Library
//!
//! Enrichment lookup over Postgres: resolves an event's payload path to the
//! session metadata used for filename derivation.

pub mod session;

pub use session::{SessionLookup, SessionRepository};
