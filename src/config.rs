use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub tmdb_access_token: Option<String>,
    pub tmdb_base_url: String,
    pub tmdb_rps: u32,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "8000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://cinematheque.db?mode=rwc".to_string());

        let tmdb_access_token = std::env::var("TMDB_API_KEY")
            .or_else(|_| std::env::var("TMDB_ACCESS_TOKEN"))
            .ok()
            .filter(|token| !token.trim().is_empty());
        let tmdb_base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());
        let tmdb_rps: u32 =
            std::env::var("TMDB_RPS").ok().and_then(|s| s.parse().ok()).unwrap_or(4);

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET is not set, using an insecure development secret");
                "cinematheque-dev-secret".to_string()
            },
        };

        let access_token_ttl_minutes: i64 = std::env::var("ACCESS_TOKEN_TTL_MINUTES")
            .ok()
            .map(|s| s.parse())
            .transpose()
            .context("ACCESS_TOKEN_TTL_MINUTES")?
            .unwrap_or(5);
        let refresh_token_ttl_days: i64 = std::env::var("REFRESH_TOKEN_TTL_DAYS")
            .ok()
            .map(|s| s.parse())
            .transpose()
            .context("REFRESH_TOKEN_TTL_DAYS")?
            .unwrap_or(1);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            tmdb_access_token,
            tmdb_base_url,
            tmdb_rps,
            jwt_secret,
            access_token_ttl_minutes,
            refresh_token_ttl_days,
        })
    }
}
