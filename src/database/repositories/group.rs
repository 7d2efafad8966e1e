//! Group repository implementation
//!
//! Groups back both the three core roles and any custom named groups an
//! administrator creates.

use sqlx::PgPool;

use crate::models::role::Group;
use crate::utils::errors::EventHubError;

#[derive(Debug, Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new group
    pub async fn create(&self, name: &str) -> Result<Group, EventHubError> {
        let group = sqlx::query_as::<_, Group>(
            "INSERT INTO groups (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    /// Find a group by name, creating it if missing
    pub async fn get_or_create(&self, name: &str) -> Result<Group, EventHubError> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    /// Find group by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Group>, EventHubError> {
        let group = sqlx::query_as::<_, Group>("SELECT id, name FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(group)
    }

    /// Find group by name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Group>, EventHubError> {
        let group = sqlx::query_as::<_, Group>("SELECT id, name FROM groups WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(group)
    }

    /// List all groups
    pub async fn list(&self) -> Result<Vec<Group>, EventHubError> {
        let groups = sqlx::query_as::<_, Group>("SELECT id, name FROM groups ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(groups)
    }

    /// Delete a group
    pub async fn delete(&self, id: i64) -> Result<(), EventHubError> {
        sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Group names a user belongs to
    pub async fn names_for_user(&self, user_id: i64) -> Result<Vec<String>, EventHubError> {
        let names: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT g.name FROM groups g
            INNER JOIN user_groups ug ON ug.group_id = g.id
            WHERE ug.user_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names.into_iter().map(|(n,)| n).collect())
    }

    /// Add a user to a group
    pub async fn add_member(&self, group_id: i64, user_id: i64) -> Result<(), EventHubError> {
        sqlx::query(
            "INSERT INTO user_groups (user_id, group_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(group_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Check whether a user belongs to a named group
    pub async fn is_member(&self, user_id: i64, group_name: &str) -> Result<bool, EventHubError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM user_groups ug
            INNER JOIN groups g ON g.id = ug.group_id
            WHERE ug.user_id = $1 AND g.name = $2
            "#,
        )
        .bind(user_id)
        .bind(group_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Remove all group memberships for a user; role assignment replaces
    /// rather than accumulates
    pub async fn clear_memberships(&self, user_id: i64) -> Result<(), EventHubError> {
        sqlx::query("DELETE FROM user_groups WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
