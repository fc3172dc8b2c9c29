use serde::{Deserialize, Serialize};

use crate::users::repo_types::User;

// Required fields are Options so a missing field becomes a 400 with the
// API's own message instead of a deserialization rejection.

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for account deletion.
#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for changing name and/or password. `password` is the current
/// password and is always required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeUserInfoRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIdsRequest {
    pub recipe_ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanRequest {
    pub recipe_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
pub struct AllergiesRequest {
    pub allergies: Option<Vec<String>>,
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Public projection of the user record. The password hash never leaves the
/// repo layer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub name: String,
    pub email: String,
    pub liked_recipes: Vec<String>,
    pub food_allergies: Vec<String>,
    pub meal_plan: Vec<i64>,
}

impl From<User> for UserInfoResponse {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            email: user.email,
            liked_recipes: user.liked_recipes,
            food_allergies: user.food_allergies,
            meal_plan: user.meal_plan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_info_serializes_camel_case_without_hash() {
        let response = UserInfoResponse {
            name: "user".into(),
            email: "user@email.com".into(),
            liked_recipes: vec!["1234".into()],
            food_allergies: vec!["peanuts".into()],
            meal_plan: vec![25449],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["name"], "user");
        assert_eq!(json["likedRecipes"][0], "1234");
        assert_eq!(json["foodAllergies"][0], "peanuts");
        assert_eq!(json["mealPlan"][0], 25449);
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn change_user_info_accepts_camel_case_new_password() {
        let body = r#"{"password": "old", "newPassword": "new"}"#;
        let parsed: ChangeUserInfoRequest = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.password.as_deref(), Some("old"));
        assert_eq!(parsed.new_password.as_deref(), Some("new"));
        assert!(parsed.name.is_none());
    }

    #[test]
    fn token_response_shape() {
        let json = serde_json::to_value(TokenResponse {
            token: "v41idt0ke9".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "token": "v41idt0ke9" }));
    }
}
