use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
}

/// Body of `POST /api/users`
#[derive(Debug, Deserialize, Validate)]
pub struct UserInput {
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(length(min = 5, max = 50, message = "\"name\" length must be between 5 and 50 characters"))]
    pub name: String,

    #[serde(deserialize_with = "super::trimmed")]
    #[validate(
        email(message = "\"email\" must be a valid email"),
        length(min = 5, max = 255, message = "\"email\" length must be between 5 and 255 characters")
    )]
    pub email: String,

    #[validate(length(min = 5, max = 255, message = "\"password\" length must be between 5 and 255 characters"))]
    pub password: String,
}

/// Body of `POST /api/auth`
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(
        email(message = "\"email\" must be a valid email"),
        length(min = 5, max = 255, message = "\"email\" length must be between 5 and 255 characters")
    )]
    pub email: String,

    #[validate(length(min = 5, max = 255, message = "\"password\" length must be between 5 and 255 characters"))]
    pub password: String,
}

impl User {
    /// Emails are compared case-insensitively
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_ascii_lowercase()
    }
}
