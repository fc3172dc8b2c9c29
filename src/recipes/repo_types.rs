use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Recipe record. Ids are the scraped source ids, not surrogate keys, which is
/// why the meal plan stores them as plain integers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub ingredients: Vec<String>,
    pub created_at: OffsetDateTime,
}
