use sqlx::PgPool;

use crate::error::ApiError;
use crate::users::repo_types::User;

const USER_COLUMNS: &str =
    "id, email, name, password_hash, liked_recipes, food_allergies, meal_plan, created_at";

// Every mutation below is a single SQL statement. Concurrent updates to the
// same record are serialized by the database, so there is no read-modify-write
// window in the application layer.
impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn list_all(db: &PgPool) -> Result<Vec<User>, ApiError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    /// Insert a new user. The unique index on email is the final arbiter of
    /// duplicates; a racing registration loses here, not at the pre-flight
    /// lookup.
    pub async fn create(
        db: &PgPool,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<User, ApiError> {
        let result = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(db)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(ApiError::DuplicateEmail(email.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace name and/or password hash; untouched fields keep their value.
    pub async fn update_info(
        db: &PgPool,
        email: &str,
        new_password_hash: Option<&str>,
        new_name: Option<&str>,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = COALESCE($2, password_hash),
                name = COALESCE($3, name)
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(new_password_hash)
        .bind(new_name)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete_by_email(db: &PgPool, email: &str) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn add_liked_recipes(
        db: &PgPool,
        email: &str,
        recipe_ids: &[String],
    ) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET liked_recipes = liked_recipes || $2::text[] WHERE email = $1")
            .bind(email)
            .bind(recipe_ids)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn remove_liked_recipes(
        db: &PgPool,
        email: &str,
        recipe_ids: &[String],
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE users
            SET liked_recipes = (
                SELECT coalesce(array_agg(x), '{}')
                FROM unnest(liked_recipes) AS x
                WHERE x <> ALL($2::text[])
            )
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(recipe_ids)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Set-add: merging twice never duplicates an allergy.
    pub async fn add_allergies(
        db: &PgPool,
        email: &str,
        allergies: &[String],
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE users
            SET food_allergies = (
                SELECT coalesce(array_agg(DISTINCT x), '{}')
                FROM unnest(food_allergies || $2::text[]) AS x
            )
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(allergies)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn remove_allergies(
        db: &PgPool,
        email: &str,
        allergies: &[String],
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE users
            SET food_allergies = (
                SELECT coalesce(array_agg(x), '{}')
                FROM unnest(food_allergies) AS x
                WHERE x <> ALL($2::text[])
            )
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(allergies)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Recipe ids with no matching recipe row are silently dropped.
    pub async fn add_meal_plan(
        db: &PgPool,
        email: &str,
        recipe_ids: &[i64],
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE users
            SET meal_plan = meal_plan || (
                SELECT coalesce(array_agg(id), '{}')
                FROM recipes
                WHERE id = ANY($2::bigint[])
            )
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(recipe_ids)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn remove_meal_plan(
        db: &PgPool,
        email: &str,
        recipe_ids: &[i64],
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE users
            SET meal_plan = (
                SELECT coalesce(array_agg(x), '{}')
                FROM unnest(meal_plan) AS x
                WHERE x <> ALL($2::bigint[])
            )
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(recipe_ids)
        .execute(db)
        .await?;
        Ok(())
    }
}
