//! User repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::role::RoleSet;
use crate::models::user::{CreateUserRequest, Principal, UpdateUserRequest, User};
use crate::utils::errors::EventHubError;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user; accounts start inactive until activation
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, EventHubError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, first_name, last_name, phone_number, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7)
            RETURNING id, username, email, first_name, last_name, phone_number, is_active, is_superuser, created_at, updated_at
            "#
        )
        .bind(request.username)
        .bind(request.email)
        .bind(request.first_name.unwrap_or_default())
        .bind(request.last_name.unwrap_or_default())
        .bind(request.phone_number.unwrap_or_default())
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, EventHubError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, first_name, last_name, phone_number, is_active, is_superuser, created_at, updated_at FROM users WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, EventHubError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, first_name, last_name, phone_number, is_active, is_superuser, created_at, updated_at FROM users WHERE username = $1"
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user
    pub async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User, EventHubError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                phone_number = COALESCE($5, phone_number),
                is_active = COALESCE($6, is_active),
                updated_at = $7
            WHERE id = $1
            RETURNING id, username, email, first_name, last_name, phone_number, is_active, is_superuser, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.email)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.phone_number)
        .bind(request.is_active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Mark an account active after a successful activation
    pub async fn activate(&self, id: i64) -> Result<User, EventHubError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = TRUE, updated_at = $2
            WHERE id = $1
            RETURNING id, username, email, first_name, last_name, phone_number, is_active, is_superuser, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Delete user
    pub async fn delete(&self, id: i64) -> Result<(), EventHubError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List all users with pagination
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, EventHubError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, email, first_name, last_name, phone_number, is_active, is_superuser, created_at, updated_at FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// All superuser accounts
    pub async fn list_superusers(&self) -> Result<Vec<User>, EventHubError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, email, first_name, last_name, phone_number, is_active, is_superuser, created_at, updated_at FROM users WHERE is_superuser = TRUE"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Users without any group membership
    pub async fn list_without_groups(&self) -> Result<Vec<User>, EventHubError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.phone_number, u.is_active, u.is_superuser, u.created_at, u.updated_at
            FROM users u
            LEFT JOIN user_groups ug ON ug.user_id = u.id
            WHERE ug.user_id IS NULL AND u.is_superuser = FALSE
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Resolve a user together with their role memberships
    pub async fn load_principal(&self, id: i64) -> Result<Option<Principal>, EventHubError> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let names: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT g.name FROM groups g
            INNER JOIN user_groups ug ON ug.group_id = g.id
            WHERE ug.user_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let roles = RoleSet::from_group_names(names.iter().map(|(n,)| n.as_str()));
        Ok(Some(Principal { user, roles }))
    }

    /// Count total users
    pub async fn count(&self) -> Result<i64, EventHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_repository_creation() {
        // This would require a test database setup
        // For now, just test that the repository can be created
        let pool = PgPool::connect("postgresql://test").await;
        if let Ok(pool) = pool {
            let repo = UserRepository::new(pool);
            assert!(!repo.pool.is_closed());
        }
    }
}
