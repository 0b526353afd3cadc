use std::{num::NonZeroU32, sync::Arc};

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::de::DeserializeOwned;

use crate::models::{ExternalFilmRecord, ExternalPersonRecord, FilmCredits, PopularPage};

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("no TMDB credential configured")]
    MissingCredential,
    #[error("TMDB request to {url} failed: {reason}")]
    RemoteUnavailable { url: String, reason: String },
    #[error("TMDB response from {url} is not valid JSON: {source}")]
    MalformedResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only lookups against the remote film catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn popular_films(&self, page: u32) -> Result<PopularPage, TmdbError>;
    async fn film_details(&self, tmdb_id: i32) -> Result<ExternalFilmRecord, TmdbError>;
    async fn film_credits(&self, tmdb_id: i32) -> Result<FilmCredits, TmdbError>;
    async fn person_details(&self, person_id: i32) -> Result<ExternalPersonRecord, TmdbError>;
}

pub struct TmdbClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        access_token: Option<String>,
        base_url: String,
        rps: u32,
    ) -> Result<Self, TmdbError> {
        let access_token = access_token
            .filter(|token| !token.trim().is_empty())
            .ok_or(TmdbError::MissingCredential)?;

        let quota = Quota::per_second(NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN));
        let limiter = Arc::new(RateLimiter::direct(quota));
        Ok(Self { client, access_token, base_url, limiter })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TmdbError> {
        self.limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        tracing::debug!(url = %url, "TMDB request");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|err| unavailable(&url, err))?
            .error_for_status()
            .map_err(|err| unavailable(&url, err))?;

        let body = resp.bytes().await.map_err(|err| unavailable(&url, err))?;
        decode(&url, &body)
    }
}

#[async_trait]
impl Catalog for TmdbClient {
    async fn popular_films(&self, page: u32) -> Result<PopularPage, TmdbError> {
        self.get("movie/popular", &[("page", page.to_string())]).await
    }

    async fn film_details(&self, tmdb_id: i32) -> Result<ExternalFilmRecord, TmdbError> {
        self.get(&format!("movie/{tmdb_id}"), &[]).await
    }

    async fn film_credits(&self, tmdb_id: i32) -> Result<FilmCredits, TmdbError> {
        self.get(&format!("movie/{tmdb_id}/credits"), &[]).await
    }

    async fn person_details(&self, person_id: i32) -> Result<ExternalPersonRecord, TmdbError> {
        self.get(&format!("person/{person_id}"), &[]).await
    }
}

fn unavailable(url: &str, err: reqwest::Error) -> TmdbError {
    let reason = match err.status() {
        Some(status) => format!("status {status}"),
        None => err.to_string(),
    };
    TmdbError::RemoteUnavailable { url: url.to_string(), reason }
}

fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T, TmdbError> {
    serde_json::from_slice(body)
        .map_err(|source| TmdbError::MalformedResponse { url: url.to_string(), source })
}
