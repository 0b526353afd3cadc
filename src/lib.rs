pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod importer;
pub mod models;
pub mod routes;
pub mod store;
pub mod tmdb;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{auth::TokenService, config::Config};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: Arc<Config>, db: DatabaseConnection) -> Self {
        let tokens = TokenService::new(
            &config.jwt_secret,
            config.access_token_ttl_minutes,
            config.refresh_token_ttl_days,
        );
        Self { config, db, tokens }
    }
}
