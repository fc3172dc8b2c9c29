use axum::{routing::get, Router};

use crate::state::AppState;

pub mod handlers;
pub mod repo;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(handlers::list_recipes))
        .route("/recipes/:id", get(handlers::get_recipe))
}
