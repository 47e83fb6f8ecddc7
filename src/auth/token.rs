use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject of the token: the user's normalized email key.
    pub sub: String,
    /// The user's id, carried so that ownership checks need no lookup.
    pub uid: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// The caller identity resolved from a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub key: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.uid,
            key: claims.sub,
        }
    }
}

/// Why a token was rejected. Only ever logged; clients get a uniform 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Malformed,
    BadSignature,
    Expired,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "malformed token"),
            TokenError::BadSignature => write!(f, "bad signature"),
            TokenError::Expired => write!(f, "token expired"),
        }
    }
}

/// Issues and validates HS256-signed tokens.
///
/// The secret is fixed at construction; there is no server-side session state, so a token
/// stays valid until its `exp` or until the process restarts with a different secret.
/// Signature comparison happens inside `jsonwebtoken` (ring's constant-time HMAC verify).
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], default_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `validate_at` with no leeway, so that `exp == now` is expired.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issues a token for `identity` that expires `ttl` from now.
    pub fn issue(&self, identity: &Identity, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let exp = now.checked_add(ttl.num_seconds()).ok_or_else(|| {
            AppError::InternalServerError("Token lifetime out of range".to_string())
        })?;
        let claims = Claims {
            sub: identity.key.clone(),
            uid: identity.user_id,
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Issues a token with the configured default lifetime.
    pub fn issue_default(&self, identity: &Identity) -> Result<String, AppError> {
        self.issue(identity, self.default_ttl)
    }

    pub fn validate(&self, token: &str) -> Result<Identity, TokenError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validates `token` as of the unix time `now`. The signature is checked before expiry.
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Identity, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims.into())
    }
}
