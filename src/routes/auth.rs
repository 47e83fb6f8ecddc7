use crate::{
    auth::{service, AuthResponse, LoginRequest, RegisterRequest, RegisterResponse},
    error::AppError,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Register a new user
///
/// Public route. Returns the created user without any password material.
///
/// ## Responses:
/// - `200 OK`: `{"message", "user"}`.
/// - `400 Bad Request`: `DUPLICATE_KEY` when the email is already registered.
/// - `422 Unprocessable Entity`: invalid email, username or password.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = service::register(&state, register_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(RegisterResponse {
        message: "User registered successfully".to_string(),
        user,
    }))
}

/// Login user
///
/// Public route. Authenticates a user and returns a bearer token.
///
/// ## Responses:
/// - `200 OK`: `{"message", "token", "user"}`.
/// - `401 Unauthorized`: `INVALID_CREDENTIALS`, whether the email or the password was wrong.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let (token, user) = service::login(&state, login_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user,
    }))
}
