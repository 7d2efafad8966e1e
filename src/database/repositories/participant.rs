//! Participant repository implementation
//!
//! Participants are registered implicitly when a user's RSVP is confirmed,
//! so the get-or-create and linking operations run inside the same
//! transaction as the RSVP write.

use sqlx::{PgPool, Postgres, Transaction};

use crate::models::participant::{CreateParticipantRequest, Participant};
use crate::utils::errors::EventHubError;

#[derive(Debug, Clone)]
pub struct ParticipantRepository {
    pool: PgPool,
}

impl ParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a participant
    pub async fn create(&self, request: CreateParticipantRequest) -> Result<Participant, EventHubError> {
        let participant = sqlx::query_as::<_, Participant>(
            "INSERT INTO participants (name, email) VALUES ($1, $2) RETURNING id, name, email",
        )
        .bind(request.name)
        .bind(request.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Find participant by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Participant>, EventHubError> {
        let participant = sqlx::query_as::<_, Participant>(
            "SELECT id, name, email FROM participants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Find a participant by (name, email), creating one if missing, inside
    /// the caller's transaction
    pub async fn get_or_create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
        email: &str,
    ) -> Result<Participant, EventHubError> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO participants (name, email) VALUES ($1, $2)
            ON CONFLICT (name, email) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name, email
            "#,
        )
        .bind(name)
        .bind(email)
        .fetch_one(&mut **tx)
        .await?;

        Ok(participant)
    }

    /// Link a participant to an event inside the caller's transaction
    pub async fn link_event(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        participant_id: i64,
        event_id: i64,
    ) -> Result<(), EventHubError> {
        sqlx::query(
            "INSERT INTO event_participants (event_id, participant_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(event_id)
        .bind(participant_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Remove an event link for the participant identified by (name, email),
    /// the same key `get_or_create` registers under. Emails are not unique
    /// across users, so matching on email alone could sever another
    /// participant's link.
    pub async fn unlink_event_by_identity(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
        email: &str,
        event_id: i64,
    ) -> Result<(), EventHubError> {
        sqlx::query(
            r#"
            DELETE FROM event_participants ep
            USING participants p
            WHERE ep.participant_id = p.id AND ep.event_id = $1 AND p.name = $2 AND p.email = $3
            "#,
        )
        .bind(event_id)
        .bind(name)
        .bind(email)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Participants linked to an event
    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<Participant>, EventHubError> {
        let participants = sqlx::query_as::<_, Participant>(
            r#"
            SELECT p.id, p.name, p.email FROM participants p
            INNER JOIN event_participants ep ON ep.participant_id = p.id
            WHERE ep.event_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// List all participants
    pub async fn list(&self) -> Result<Vec<Participant>, EventHubError> {
        let participants = sqlx::query_as::<_, Participant>(
            "SELECT id, name, email FROM participants ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// Delete participant
    pub async fn delete(&self, id: i64) -> Result<(), EventHubError> {
        sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Count total participants
    pub async fn count(&self) -> Result<i64, EventHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM participants")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_participant_repository_creation() {
        let pool = PgPool::connect("postgresql://test").await;
        if let Ok(pool) = pool {
            let repo = ParticipantRepository::new(pool);
            assert!(!repo.pool.is_closed());
        }
    }
}
