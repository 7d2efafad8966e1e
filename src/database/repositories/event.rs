//! Event repository implementation

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::event::{CreateEventRequest, DashboardCounts, Event, EventFilter, UpdateEventRequest};
use crate::utils::errors::EventHubError;

const EVENT_COLUMNS: &str =
    "id, name, description, image, starts_at, location, category_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(&self, request: CreateEventRequest) -> Result<Event, EventHubError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (name, description, image, starts_at, location, category_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, description, image, starts_at, location, category_id, created_at, updated_at
            "#
        )
        .bind(request.name)
        .bind(request.description)
        .bind(request.image.unwrap_or_else(|| "event_images/default.jpg".to_string()))
        .bind(request.starts_at)
        .bind(request.location)
        .bind(request.category_id)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, EventHubError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Update event
    pub async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Event, EventHubError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                image = COALESCE($4, image),
                starts_at = COALESCE($5, starts_at),
                location = COALESCE($6, location),
                category_id = COALESCE($7, category_id),
                updated_at = $8
            WHERE id = $1
            RETURNING id, name, description, image, starts_at, location, category_id, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.name)
        .bind(request.description)
        .bind(request.image)
        .bind(request.starts_at)
        .bind(request.location)
        .bind(request.category_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Delete event
    pub async fn delete(&self, id: i64) -> Result<(), EventHubError> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List events matching the dashboard search filters, newest first
    pub async fn search(&self, filter: &EventFilter) -> Result<Vec<Event>, EventHubError> {
        let search = filter.search.as_ref().map(|s| format!("%{}%", s));

        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE ($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1 OR location ILIKE $1)
              AND ($2::bigint IS NULL OR category_id = $2)
              AND ($3::timestamptz IS NULL OR starts_at >= $3)
              AND ($4::timestamptz IS NULL OR starts_at <= $4)
            ORDER BY starts_at DESC
            "#
        ))
        .bind(search)
        .bind(filter.category_id)
        .bind(filter.starts_after)
        .bind(filter.starts_before)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Upcoming events, soonest first
    pub async fn list_upcoming(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<Event>, EventHubError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE starts_at >= $1 ORDER BY starts_at ASC LIMIT $2"
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Previous events, most recent first
    pub async fn list_past(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<Event>, EventHubError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE starts_at < $1 ORDER BY starts_at DESC LIMIT $2"
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Aggregate counts for the management dashboard
    pub async fn dashboard_counts(&self, now: DateTime<Utc>) -> Result<DashboardCounts, EventHubError> {
        let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM events),
                (SELECT COUNT(*) FROM participants),
                (SELECT COUNT(*) FROM categories),
                (SELECT COUNT(*) FROM events WHERE starts_at >= $1),
                (SELECT COUNT(*) FROM events WHERE starts_at < $1)
            "#,
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardCounts {
            total_events: row.0,
            total_participants: row.1,
            total_categories: row.2,
            upcoming_events: row.3,
            past_events: row.4,
        })
    }

    /// Count total events
    pub async fn count(&self) -> Result<i64, EventHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_repository_creation() {
        let pool = PgPool::connect("postgresql://test").await;
        if let Ok(pool) = pool {
            let repo = EventRepository::new(pool);
            assert!(!repo.pool.is_closed());
        }
    }
}
