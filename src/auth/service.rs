//! Registration and login: the public flows that bypass `AuthMiddleware` and instead drive
//! the password hasher, the user directory and the token service directly.

use actix_web::web;
use validator::Validate;

use crate::auth::{Identity, LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::models::{normalize_key, NewUser, User};
use crate::state::AppState;

/// Creates an account. Reports a taken key as `DuplicateKey`.
///
/// The existence pre-check only avoids hashing for obvious duplicates; the directory's
/// `create` is what actually guarantees uniqueness.
pub async fn register(state: &AppState, input: RegisterRequest) -> Result<User, AppError> {
    input.validate()?;
    let email = normalize_key(&input.email);

    if state.users.exists_by_key(&email).await? {
        return Err(crate::store::duplicate_key(&email));
    }

    let hasher = state.hasher;
    let password = input.password;
    let password_hash = web::block(move || hasher.hash(&password)).await??;

    let user = state
        .users
        .create(NewUser {
            email,
            username: input.username,
            password_hash,
        })
        .await?;

    log::info!("registered user {}", user.id);
    Ok(user)
}

/// Checks credentials and issues a token. Unknown key and wrong password are the same error.
pub async fn login(state: &AppState, input: LoginRequest) -> Result<(String, User), AppError> {
    input.validate()?;

    let hasher = state.hasher;
    let Some(user) = state.users.find_by_key(&input.email).await? else {
        // Same bcrypt work as a wrong password, so timing does not reveal the account.
        web::block(move || hasher.verify_dummy()).await?;
        log::debug!("login failed: unknown key");
        return Err(AppError::InvalidCredentials);
    };

    let password = input.password;
    let stored_hash = user.password_hash.clone();
    let matches = web::block(move || hasher.verify(&password, &stored_hash)).await??;
    if !matches {
        log::debug!("login failed: password mismatch for user {}", user.id);
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue_default(&Identity {
        user_id: user.id,
        key: user.email.clone(),
    })?;
    Ok((token, user))
}
