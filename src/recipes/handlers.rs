use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{error::ApiError, recipes::repo_types::Recipe, state::AppState};

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl Pagination {
    /// Negative values would surface as a database error; treat them as 0.
    fn clamped(&self) -> (i64, i64) {
        (self.limit.max(0), self.offset.max(0))
    }
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let (limit, offset) = p.clamped();
    let recipes = Recipe::list(&state.db, limit, offset).await?;
    Ok(Json(recipes))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Recipe>, ApiError> {
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    Ok(Json(recipe))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.limit, 50);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn pagination_clamps_negative_values() {
        let p: Pagination = serde_json::from_str(r#"{"limit": -1, "offset": -5}"#).unwrap();
        assert_eq!(p.clamped(), (0, 0));
    }
}
