use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    error::ApiError,
    state::AppState,
    users::{
        dto::{
            AllergiesRequest, ChangeUserInfoRequest, DeleteUserRequest, LoginRequest,
            MealPlanRequest, RecipeIdsRequest, RegisterRequest, TokenResponse, UserInfoResponse,
        },
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo_types::User,
    },
};

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Both login and delete take the same email+password pair with the same
/// missing-field message.
fn require_credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<(String, String), ApiError> {
    match (email, password) {
        (Some(email), Some(password)) => Ok((normalize_email(&email), password)),
        _ => Err(ApiError::Validation(
            "Email and Password must be provided".into(),
        )),
    }
}

/// Change-info needs the current password plus at least one field to change.
fn require_change_fields(
    password: Option<String>,
    new_password: Option<String>,
    name: Option<String>,
) -> Result<(String, Option<String>, Option<String>), ApiError> {
    let password = password.ok_or(ApiError::PasswordRequired)?;
    if new_password.is_none() && name.is_none() {
        return Err(ApiError::Validation(
            "New password or new name must be provided.".into(),
        ));
    }
    Ok((password, new_password, name))
}

/// Look up the record and prove the password against it. Shared by login,
/// change-info and delete: credential mutations must re-verify the current
/// password, a bearer token alone is not proof.
async fn authorize(state: &AppState, email: &str, password: &str) -> Result<User, ApiError> {
    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or(ApiError::UnknownUser)?;
    if !verify_password(password, &user.password_hash)? {
        return Err(ApiError::WrongPassword);
    }
    Ok(user)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let (name, email, password) = match (payload.name, payload.email, payload.password) {
        (Some(name), Some(email), Some(password)) => (name, normalize_email(&email), password),
        _ => {
            return Err(ApiError::Validation(
                "Email, name and Password must be provided".into(),
            ))
        }
    };

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    // Pre-flight only; the unique index decides concurrent registrations.
    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::DuplicateEmail(email));
    }

    let hash = hash_password(&password)?;
    let user = User::create(&state.db, &email, &name, &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user.email, &user.name)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let (email, password) = require_credentials(payload.email, payload.password)?;

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    let user = authorize(&state, &email, &password).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user.email, &user.name)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn delete_user(
    State(state): State<AppState>,
    Json(payload): Json<DeleteUserRequest>,
) -> Result<StatusCode, ApiError> {
    let (email, password) = require_credentials(payload.email, payload.password)?;

    let user = authorize(&state, &email, &password).await?;
    User::delete_by_email(&state.db, &user.email).await?;

    info!(user_id = %user.id, email = %user.email, "user deleted");
    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserInfoResponse>>, ApiError> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(users.into_iter().map(UserInfoResponse::from).collect()))
}

#[instrument(skip(state, claims))]
pub async fn get_user_info(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<UserInfoResponse>, ApiError> {
    let user = User::find_by_email(&state.db, &claims.email)
        .await?
        .ok_or(ApiError::UnknownUser)?;
    Ok(Json(UserInfoResponse::from(user)))
}

#[instrument(skip(state, claims, payload))]
pub async fn change_user_info(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<ChangeUserInfoRequest>,
) -> Result<StatusCode, ApiError> {
    let (password, new_password, name) =
        require_change_fields(payload.password, payload.new_password, payload.name)?;

    // Re-verify the current password before touching credentials; a wrong
    // password leaves the stored hash untouched.
    let user = authorize(&state, &claims.email, &password).await?;

    let new_hash = new_password.as_deref().map(hash_password).transpose()?;
    User::update_info(&state.db, &user.email, new_hash.as_deref(), name.as_deref()).await?;

    info!(user_id = %user.id, email = %user.email, "user info changed");
    Ok(StatusCode::OK)
}

#[instrument(skip(state, claims, payload))]
pub async fn add_liked_recipes(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<RecipeIdsRequest>,
) -> Result<StatusCode, ApiError> {
    let recipe_ids = payload
        .recipe_ids
        .ok_or_else(|| ApiError::Validation("recipeIds must be provided".into()))?;
    User::add_liked_recipes(&state.db, &claims.email, &recipe_ids).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state, claims, payload))]
pub async fn remove_liked_recipes(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<RecipeIdsRequest>,
) -> Result<StatusCode, ApiError> {
    let recipe_ids = payload
        .recipe_ids
        .ok_or_else(|| ApiError::Validation("recipeIds must be provided".into()))?;
    User::remove_liked_recipes(&state.db, &claims.email, &recipe_ids).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state, claims, payload))]
pub async fn add_allergies(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<AllergiesRequest>,
) -> Result<StatusCode, ApiError> {
    let allergies = payload
        .allergies
        .ok_or_else(|| ApiError::Validation("allergies must be provided".into()))?;
    User::add_allergies(&state.db, &claims.email, &allergies).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state, claims, payload))]
pub async fn remove_allergies(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<AllergiesRequest>,
) -> Result<StatusCode, ApiError> {
    let allergies = payload
        .allergies
        .ok_or_else(|| ApiError::Validation("allergies must be provided".into()))?;
    User::remove_allergies(&state.db, &claims.email, &allergies).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state, claims, payload))]
pub async fn add_meal_plan(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<MealPlanRequest>,
) -> Result<StatusCode, ApiError> {
    let recipe_ids = payload
        .recipe_ids
        .ok_or_else(|| ApiError::Validation("recipeIds must be provided".into()))?;
    User::add_meal_plan(&state.db, &claims.email, &recipe_ids).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state, claims, payload))]
pub async fn remove_meal_plan(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<MealPlanRequest>,
) -> Result<StatusCode, ApiError> {
    let recipe_ids = payload
        .recipe_ids
        .ok_or_else(|| ApiError::Validation("recipeIds must be provided".into()))?;
    User::remove_meal_plan(&state.db, &claims.email, &recipe_ids).await?;
    Ok(StatusCode::OK)
}
