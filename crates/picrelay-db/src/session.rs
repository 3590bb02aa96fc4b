//! Session enrichment lookup.
//!
//! Two sequential point queries: image path → session id → session row.
//! Absence at either step, or any query failure, degrades to `None`; the
//! lookup never surfaces an error to its caller, so the handler always has a
//! value to thread through derivation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

use picrelay_core::{EnrichmentShape, SessionRecord};

/// Resolves session metadata for one event payload path.
///
/// The handler depends on this trait rather than on the repository so tests
/// can substitute an in-memory lookup.
#[async_trait]
pub trait SessionLookup: Send + Sync {
    /// Resolve the session record for a stored final path, or `None` when the
    /// path is unknown, the session row is missing, or the query fails.
    async fn lookup(&self, path: &str) -> Option<SessionRecord>;
}

/// Postgres-backed [`SessionLookup`].
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
    shape: EnrichmentShape,
}

impl SessionRepository {
    pub fn new(pool: PgPool, shape: EnrichmentShape) -> Self {
        Self { pool, shape }
    }

    async fn session_id_for_path(&self, path: &str) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<Postgres, i64>(
            "SELECT session_id FROM images WHERE final_path = $1",
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await
    }

    async fn session_by_id(
        &self,
        session_id: i64,
    ) -> Result<Option<SessionRecord>, sqlx::Error> {
        // One enrichment shape is active per deployment; the second column
        // fills `style_tag` either way.
        let query = match self.shape {
            EnrichmentShape::Style => {
                "SELECT name, style FROM sessions WHERE session_id = $1"
            }
            EnrichmentShape::Email => {
                "SELECT name, email FROM sessions WHERE session_id = $1"
            }
        };
        let row = sqlx::query_as::<Postgres, (Option<String>, Option<String>)>(query)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(display_name, style_tag)| SessionRecord {
            session_id,
            display_name,
            style_tag,
        }))
    }
}

#[async_trait]
impl SessionLookup for SessionRepository {
    async fn lookup(&self, path: &str) -> Option<SessionRecord> {
        let session_id = match self.session_id_for_path(path).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                tracing::debug!(path = %path, "No image row for path, using original token");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %path, "Image lookup failed, using original token");
                return None;
            }
        };

        match self.session_by_id(session_id).await {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                tracing::debug!(
                    session_id = session_id,
                    path = %path,
                    "No session row for id, using original token"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    session_id = session_id,
                    path = %path,
                    "Session lookup failed, using original token"
                );
                None
            }
        }
    }
}
