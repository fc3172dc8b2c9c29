use sqlx::PgPool;

use crate::error::ApiError;
use crate::recipes::repo_types::Recipe;

impl Recipe {
    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<Recipe>, ApiError> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, title, ingredients, created_at
            FROM recipes
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<Recipe>, ApiError> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, title, ingredients, created_at
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(recipe)
    }
}
