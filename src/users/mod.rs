use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::list_users)
                .post(handlers::register)
                .delete(handlers::delete_user),
        )
        .route("/users/login", post(handlers::login))
        .route(
            "/users/user_info",
            get(handlers::get_user_info).put(handlers::change_user_info),
        )
        .route(
            "/users/liked_recipes",
            post(handlers::add_liked_recipes).delete(handlers::remove_liked_recipes),
        )
        .route(
            "/users/allergies",
            post(handlers::add_allergies).delete(handlers::remove_allergies),
        )
        .route(
            "/users/meal_plan",
            post(handlers::add_meal_plan).delete(handlers::remove_meal_plan),
        )
}
