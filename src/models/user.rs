// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::friendship::FriendshipState;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique login identifier.
    pub email: String,

    pub name: String,
    pub surname: String,
    pub age: i64,
    pub sex: String,
    pub interests: String,
    pub city: String,

    /// Plaintext password, only present between form parsing and hashing.
    /// Never stored and never serialized.
    #[sqlx(skip)]
    #[serde(skip)]
    pub password: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub encrypted_password: String,
}

impl User {
    /// Drops the plaintext password once it is no longer needed.
    pub fn sanitize(&mut self) {
        self.password.clear();
    }
}

/// Public projection of a user, used by listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub age: i64,
    pub sex: String,
    pub interests: String,
    pub city: String,
}

/// Profile page payload: the user plus how the viewer relates to them.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: User,
    /// `None` for anonymous viewers and for a user viewing their own page.
    pub friendship: Option<FriendshipState>,
}

/// Form for creating a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(
        length(min = 1, max = 255, message = "Email is required."),
        email(message = "Email is not valid.")
    )]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub name: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub surname: String,
    /// Kept as text so a non-numeric value can be reported as a validation error.
    #[serde(default)]
    pub age: String,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub sex: String,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub interests: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub city: String,
}

/// Form for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Form for editing the current user's profile.
/// An empty `password` keeps the stored credentials.
#[derive(Debug, Deserialize, Validate)]
pub struct EditProfileForm {
    #[validate(length(max = 100))]
    #[serde(default)]
    pub name: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub age: String,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub sex: String,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub interests: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub city: String,
    #[validate(length(max = 128))]
    #[serde(default)]
    pub password: String,
}

/// Query parameters for the main page listing.
#[derive(Debug, Deserialize)]
pub struct TopUsersParams {
    /// Number of users to return (default: 20, max: 100).
    pub limit: Option<i64>,
}

/// Parses the free-text `age` form field.
pub fn parse_age(raw: &str) -> Result<i64, String> {
    let age = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| "wrong age format, must be number".to_string())?;

    if !(0..=150).contains(&age) {
        return Err("age must be between 0 and 150".to_string());
    }

    Ok(age)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_age_accepts_numbers() {
        assert_eq!(parse_age("42"), Ok(42));
        assert_eq!(parse_age(" 7 "), Ok(7));
    }

    #[test]
    fn parse_age_rejects_garbage() {
        assert_eq!(
            parse_age("forty").unwrap_err(),
            "wrong age format, must be number"
        );
        assert!(parse_age("").is_err());
        assert!(parse_age("-1").is_err());
        assert!(parse_age("200").is_err());
    }

    #[test]
    fn sanitize_clears_plaintext_only() {
        let mut user = User {
            password: "secret".to_string(),
            encrypted_password: "$argon2id$...".to_string(),
            ..Default::default()
        };
        user.sanitize();
        assert!(user.password.is_empty());
        assert_eq!(user.encrypted_password, "$argon2id$...");
    }

    #[test]
    fn serialization_hides_credentials() {
        let user = User {
            id: 1,
            email: "a@x.com".to_string(),
            password: "secret".to_string(),
            encrypted_password: "hash".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("encrypted_password").is_none());
        assert_eq!(json["email"], "a@x.com");
    }
}
