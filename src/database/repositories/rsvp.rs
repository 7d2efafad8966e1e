//! RSVP repository implementation
//!
//! The write path is transaction-scoped: the toggle flow locks the event's
//! RSVP rows, decides the transition and writes inside one transaction so the
//! uniqueness check and the write cannot be interleaved by another caller.

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::rsvp::{Rsvp, RsvpStatus, RsvpSummary};
use crate::utils::errors::EventHubError;

const RSVP_COLUMNS: &str = "id, user_id, event_id, status, notes, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct RsvpRepository {
    pool: PgPool,
}

impl RsvpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find RSVP by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Rsvp>, EventHubError> {
        let rsvp = sqlx::query_as::<_, Rsvp>(&format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rsvp)
    }

    /// Lock all RSVP rows for an event for the duration of the transaction.
    /// Returns them newest first.
    pub async fn lock_for_event(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
    ) -> Result<Vec<Rsvp>, EventHubError> {
        let rsvps = sqlx::query_as::<_, Rsvp>(&format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps WHERE event_id = $1 ORDER BY created_at DESC FOR UPDATE"
        ))
        .bind(event_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rsvps)
    }

    /// Insert a new RSVP row inside the toggle transaction
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        event_id: i64,
        status: RsvpStatus,
    ) -> Result<Rsvp, EventHubError> {
        let rsvp = sqlx::query_as::<_, Rsvp>(&format!(
            r#"
            INSERT INTO rsvps (user_id, event_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {RSVP_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(event_id)
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;

        Ok(rsvp)
    }

    /// Transition an existing RSVP row inside the toggle transaction
    pub async fn set_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        status: RsvpStatus,
    ) -> Result<Rsvp, EventHubError> {
        let rsvp = sqlx::query_as::<_, Rsvp>(&format!(
            r#"
            UPDATE rsvps
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING {RSVP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;

        Ok(rsvp)
    }

    /// Delete an RSVP row (administrative cleanup)
    pub async fn delete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
    ) -> Result<(), EventHubError> {
        sqlx::query("DELETE FROM rsvps WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// The confirmed RSVP for an event, if any
    pub async fn find_confirmed_for_event(&self, event_id: i64) -> Result<Option<Rsvp>, EventHubError> {
        let rsvp = sqlx::query_as::<_, Rsvp>(&format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps WHERE event_id = $1 AND status = 'confirmed'"
        ))
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rsvp)
    }

    /// A user's RSVPs, newest first, optionally restricted to one status
    pub async fn list_for_user(
        &self,
        user_id: i64,
        status: Option<RsvpStatus>,
    ) -> Result<Vec<Rsvp>, EventHubError> {
        let rsvps = sqlx::query_as::<_, Rsvp>(&format!(
            r#"
            SELECT {RSVP_COLUMNS} FROM rsvps
            WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rsvps)
    }

    /// All RSVPs for an event, newest first
    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<Rsvp>, EventHubError> {
        let rsvps = sqlx::query_as::<_, Rsvp>(&format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps WHERE event_id = $1 ORDER BY created_at DESC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rsvps)
    }

    /// All RSVPs system-wide, newest first
    pub async fn list_all(&self) -> Result<Vec<Rsvp>, EventHubError> {
        let rsvps = sqlx::query_as::<_, Rsvp>(&format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rsvps)
    }

    /// Confirmed/cancelled tallies for the management screen
    pub async fn summary(&self) -> Result<RsvpSummary, EventHubError> {
        let row: (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'confirmed'),
                COUNT(*) FILTER (WHERE status = 'cancelled')
            FROM rsvps
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(RsvpSummary {
            total: row.0,
            confirmed: row.1,
            cancelled: row.2,
        })
    }

    /// Count of confirmed RSVPs for an event
    pub async fn confirmed_count(&self, event_id: i64) -> Result<i64, EventHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM rsvps WHERE event_id = $1 AND status = 'confirmed'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rsvp_repository_creation() {
        let pool = PgPool::connect("postgresql://test").await;
        if let Ok(pool) = pool {
            let repo = RsvpRepository::new(pool);
            assert!(!repo.pool.is_closed());
        }
    }
}
