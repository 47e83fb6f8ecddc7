use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use todokeep::{auth::AuthMiddleware, routes, AppState, Config};

fn cors(config: &Config) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);
    match &config.cors_allowed_origin {
        Some(origin) => cors.allowed_origin(origin),
        None => cors.allow_any_origin(),
    }
}

fn startup_error(e: todokeep::AppError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let state = AppState::init(&config).await.map_err(startup_error)?;

    log::info!(
        "Starting todokeep server at {} (token ttl {}s, bcrypt cost {})",
        config.server_url(),
        config.token_ttl.num_seconds(),
        config.bcrypt_cost
    );

    let tokens = Arc::clone(&state.tokens);
    let data = web::Data::new(state);
    let server_config = config.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(AuthMiddleware::new(
                Arc::clone(&tokens),
                routes::public_routes(),
            ))
            .wrap(cors(&server_config))
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
