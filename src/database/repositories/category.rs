//! Category repository implementation

use sqlx::PgPool;

use crate::models::category::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use crate::utils::errors::EventHubError;

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new category
    pub async fn create(&self, request: CreateCategoryRequest) -> Result<Category, EventHubError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
        )
        .bind(request.name)
        .bind(request.description.unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Find category by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Category>, EventHubError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Update category
    pub async fn update(
        &self,
        id: i64,
        request: UpdateCategoryRequest,
    ) -> Result<Category, EventHubError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING id, name, description
            "#,
        )
        .bind(id)
        .bind(request.name)
        .bind(request.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Delete category
    pub async fn delete(&self, id: i64) -> Result<(), EventHubError> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List all categories
    pub async fn list(&self) -> Result<Vec<Category>, EventHubError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Count total categories
    pub async fn count(&self) -> Result<i64, EventHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
