//! Test database helper utilities
//!
//! Integration tests run against a real Postgres instance named by
//! `TEST_DATABASE_URL`. When the variable is unset the suites skip, so the
//! unit tests stay runnable without any infrastructure.

use sqlx::PgPool;

use eventhub::database::{run_migrations, DatabaseService};

pub struct TestDatabase {
    pub pool: PgPool,
}

impl TestDatabase {
    /// Connect to the configured test database, migrate it and wipe all
    /// tables. Returns `None` when no test database is configured.
    pub async fn try_new() -> Option<Self> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = PgPool::connect(&url).await.ok()?;
        run_migrations(&pool).await.ok()?;

        let db = Self { pool };
        db.truncate_all().await.ok()?;
        Some(db)
    }

    pub fn service(&self) -> DatabaseService {
        DatabaseService::new(self.pool.clone())
    }

    async fn truncate_all(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "TRUNCATE user_groups, groups, event_participants, participants, rsvps, events, categories, users RESTART IDENTITY CASCADE",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
