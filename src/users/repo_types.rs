use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database, keyed by the unique email.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, never exposed in JSON
    pub liked_recipes: Vec<String>,
    pub food_allergies: Vec<String>,
    pub meal_plan: Vec<i64>,
    pub created_at: OffsetDateTime,
}
