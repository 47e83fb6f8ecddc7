#![doc = "The `todokeep` library crate."]
#![doc = ""]
#![doc = "A multi-user todo service. Users register and log in to receive a signed, stateless"]
#![doc = "bearer token; every other route resolves the caller from that token in `AuthMiddleware`"]
#![doc = "and every todo access is checked against its owner by `AccessPolicy`."]
#![doc = "The binary (`main.rs`) wires configuration, storage and the HTTP server together."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::AppState;
