#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::{json, Value};
use todokeep::{AppState, Config};

/// Builds the full application (routes + `AuthMiddleware`) around `$state`.
macro_rules! test_app {
    ($state:expr) => {{
        let state: todokeep::AppState = $state;
        let tokens = std::sync::Arc::clone(&state.tokens);
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(state))
                .wrap(todokeep::auth::AuthMiddleware::new(
                    tokens,
                    todokeep::routes::public_routes(),
                ))
                .configure(todokeep::routes::config),
        )
        .await
    }};
}

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config(mask_foreign: bool) -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        "BCRYPT_COST" => Some("4".to_string()),
        "MASK_FOREIGN_RESOURCES" => Some(mask_foreign.to_string()),
        _ => None,
    })
    .expect("test config should be valid")
}

pub fn test_state() -> AppState {
    AppState::in_memory(&test_config(false))
}

/// Sends a JSON request and returns the status and parsed body (`Null` if empty).
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: test::TestRequest,
) -> (StatusCode, Value) {
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            panic!("non-JSON body: {}", String::from_utf8_lossy(&body))
        })
    };
    (status, json)
}

pub fn with_token(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
}

pub async fn register(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> (StatusCode, Value) {
    send(
        app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "email": email, "password": password })),
    )
    .await
}

pub async fn login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> (StatusCode, Value) {
    send(
        app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": email, "password": password })),
    )
    .await
}

/// A registered, logged-in user.
pub struct TestUser {
    pub id: String,
    pub token: String,
}

pub async fn register_and_login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> TestUser {
    let (status, body) = register(app, email, password).await;
    assert_eq!(status, StatusCode::OK, "registration failed: {}", body);

    let (status, body) = login(app, email, password).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);

    TestUser {
        id: body["user"]["id"].as_str().expect("user id").to_string(),
        token: body["token"].as_str().expect("token").to_string(),
    }
}
