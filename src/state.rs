use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::auth::{AccessPolicy, PasswordHasher, TokenService};
use crate::config::Config;
use crate::error::AppError;
use crate::store::{
    InMemoryTodoStore, InMemoryUserDirectory, PgTodoStore, PgUserDirectory, TodoStore,
    UserDirectory,
};

/// Everything a handler needs, shared across workers through `web::Data`.
///
/// The token secret and hasher settings are fixed here at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserDirectory>,
    pub todos: Arc<dyn TodoStore>,
    pub hasher: PasswordHasher,
    pub tokens: Arc<TokenService>,
    pub policy: AccessPolicy,
}

impl AppState {
    pub fn from_parts(
        config: &Config,
        users: Arc<dyn UserDirectory>,
        todos: Arc<dyn TodoStore>,
    ) -> Self {
        Self {
            users,
            todos,
            hasher: PasswordHasher::new(config.bcrypt_cost),
            tokens: Arc::new(TokenService::new(
                config.jwt_secret.as_bytes(),
                config.token_ttl,
            )),
            policy: AccessPolicy::new(config.mask_foreign_resources),
        }
    }

    pub fn in_memory(config: &Config) -> Self {
        Self::from_parts(
            config,
            Arc::new(InMemoryUserDirectory::new()),
            Arc::new(InMemoryTodoStore::new()),
        )
    }

    /// Connects to Postgres when `DATABASE_URL` is set, otherwise falls back to memory.
    pub async fn init(config: &Config) -> Result<Self, AppError> {
        let Some(database_url) = config.database_url.as_deref() else {
            log::warn!("DATABASE_URL not set; using in-memory storage, data will not persist");
            return Ok(Self::in_memory(config));
        };

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))?;
        log::info!("Connected to Postgres and applied migrations");

        Ok(Self::from_parts(
            config,
            Arc::new(PgUserDirectory::new(pool.clone())),
            Arc::new(PgTodoStore::new(pool)),
        ))
    }
}
