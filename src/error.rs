use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Everything a handler can fail with. Internal variants keep the real cause
/// for logging; the outward status/body is decided in `into_response`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} is already used, please use another email.")]
    DuplicateEmail(String),

    #[error("username does not exist")]
    UnknownUser,

    #[error("password is wrong")]
    WrongPassword,

    #[error("Password must be provided.")]
    PasswordRequired,

    #[error("Invalid or Missing Token, please include a valid token in the header")]
    InvalidToken,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::DuplicateEmail(_) => (StatusCode::CONFLICT, self.to_string()),
            // Unknown email and wrong password are indistinguishable to the
            // caller, so registered emails cannot be enumerated.
            ApiError::UnknownUser | ApiError::WrongPassword => {
                warn!(reason = %self, "login rejected");
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ApiError::PasswordRequired => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::InvalidToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Hashing(_) | ApiError::TokenSigning(_) | ApiError::Database(_) => {
                error!(error = %self, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn response_parts(err: ApiError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_maps_to_400_with_message() {
        let (status, body) =
            response_parts(ApiError::Validation("Email and Password must be provided".into()))
                .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email and Password must be provided");
    }

    #[tokio::test]
    async fn duplicate_email_maps_to_409() {
        let (status, body) =
            response_parts(ApiError::DuplicateEmail("user@email.com".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["error"],
            "user@email.com is already used, please use another email."
        );
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_indistinguishable() {
        let (unknown_status, unknown_body) = response_parts(ApiError::UnknownUser).await;
        let (wrong_status, wrong_body) = response_parts(ApiError::WrongPassword).await;
        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, wrong_status);
        assert_eq!(unknown_body, wrong_body);
    }

    #[tokio::test]
    async fn invalid_token_uses_the_fixed_message() {
        let (status, body) = response_parts(ApiError::InvalidToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["error"],
            "Invalid or Missing Token, please include a valid token in the header"
        );
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let (status, body) =
            response_parts(ApiError::Hashing("salt generation exploded".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");
    }
}
