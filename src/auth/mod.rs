pub mod extractors;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod service;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::User;

// Re-export necessary items
pub use middleware::{AuthMiddleware, PublicRoutes};
pub use password::PasswordHasher;
pub use policy::{AccessPolicy, Owned};
pub use token::{Claims, Identity, TokenError, TokenService};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// The account key (email).
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address for the new account. This is the unique login key.
    #[validate(email)]
    pub email: String,
    /// Optional display name.
    /// Must be between 3 and 32 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: Option<String>,
    /// At least 6 characters and at most 72 bytes, the most bcrypt will read.
    #[validate(length(min = 6), custom = "validate_password_bytes")]
    pub password: String,
}

fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > password::MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("password_too_long"));
    }
    Ok(())
}

/// Response after successful registration. The user never carries its password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

/// Response after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let empty_password = LoginRequest {
            email: "test@example.com".to_string(),
            password: String::new(),
        };
        assert!(empty_password.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            email: "test@example.com".to_string(),
            username: Some("test_user-123".to_string()),
            password: "password123".to_string(),
        };
        assert!(valid_register.validate().is_ok());

        let no_username = RegisterRequest {
            email: "test@example.com".to_string(),
            username: None,
            password: "password123".to_string(),
        };
        assert!(no_username.validate().is_ok());

        let invalid_username_register = RegisterRequest {
            email: "test@example.com".to_string(),
            username: Some("test user!".to_string()), // Contains space and exclamation
            password: "password123".to_string(),
        };
        assert!(invalid_username_register.validate().is_err());

        let invalid_email = RegisterRequest {
            email: "testexample.com".to_string(),
            username: None,
            password: "password123".to_string(),
        };
        assert!(invalid_email.validate().is_err());

        let short_password = RegisterRequest {
            email: "test@example.com".to_string(),
            username: None,
            password: "123".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_register_password_limit_counts_bytes() {
        let at_limit = RegisterRequest {
            email: "test@example.com".to_string(),
            username: None,
            password: "a".repeat(72),
        };
        assert!(at_limit.validate().is_ok());

        // 72 characters but 216 bytes.
        let multibyte = RegisterRequest {
            email: "test@example.com".to_string(),
            username: None,
            password: "\u{20ac}".repeat(72),
        };
        assert!(multibyte.validate().is_err());
    }
}
