use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account.
///
/// `email` is the unique lookup key and the token subject. It is always stored in the
/// normalized form produced by [`normalize_key`]. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The fields needed to persist a new user. The hash is produced before this is built.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: Option<String>,
    pub password_hash: String,
}

impl User {
    pub fn new(input: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: normalize_key(&input.email),
            username: input.username,
            password_hash: input.password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Keys are compared case-insensitively: trimmed and lower-cased at storage and lookup time.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation_normalizes_email() {
        let user = User::new(NewUser {
            email: "  Alice@Example.COM ".to_string(),
            username: Some("alice".to_string()),
            password_hash: "$2b$04$hash".to_string(),
        });

        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User::new(NewUser {
            email: "a@x.com".to_string(),
            username: None,
            password_hash: "$2b$04$secret-hash".to_string(),
        });

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@x.com");
    }
}
