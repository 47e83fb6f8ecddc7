pub mod auth;
pub mod health;
pub mod todos;

use actix_web::{http::Method, web};

use crate::auth::PublicRoutes;
use crate::error::AppError;

/// The only routes reachable without a bearer token. Everything else is denied by default.
pub fn public_routes() -> PublicRoutes {
    PublicRoutes::new()
        .allow(Method::GET, "/health")
        .allow(Method::POST, "/auth/register")
        .allow(Method::POST, "/auth/login")
}

/// JSON bodies that fail to parse become a `BAD_REQUEST` in the usual error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(format!("Invalid JSON body: {}", err)).into())
}

/// Path segments that do not parse, such as a non-UUID id, become a `BAD_REQUEST`.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(format!("Invalid path: {}", err)).into())
}

/// Same for query strings, e.g. `?completed=maybe`.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query string: {}", err)).into()
    })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(health::health)
        .service(
            web::scope("/auth")
                .service(auth::login)
                .service(auth::register),
        )
        .service(
            web::scope("/todos")
                .service(todos::list_todos)
                .service(todos::create_todo)
                .service(todos::get_todo)
                .service(todos::update_todo)
                .service(todos::delete_todo),
        );
}
