use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use jiff::civil::Date;
use serde::{Deserialize, Deserializer};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{AppState, error::AppError};

mod auth;
mod authors;
mod films;
mod spectators;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/refresh", post(auth::refresh))
        .route("/films", get(films::list))
        .route("/films/year/{year}", get(films::by_year))
        .route("/films/{id}", get(films::detail).put(films::update).patch(films::update))
        .route("/films/{id}/rate", post(spectators::rate_film))
        .route("/authors", get(authors::list))
        .route(
            "/authors/{id}",
            get(authors::detail).put(authors::update).patch(authors::update).delete(authors::destroy),
        )
        .route("/authors/{id}/rate", post(spectators::rate_author))
        .route("/favorites/films", get(spectators::favorite_films))
        .route("/favorites/films/{id}/add", post(spectators::add_favorite_film))
        .route("/favorites/films/{id}/remove", delete(spectators::remove_favorite_film))
        .route("/favorites/authors", get(spectators::favorite_authors))
        .route("/favorites/authors/{id}/add", post(spectators::add_favorite_author))
        .route("/favorites/authors/{id}/remove", delete(spectators::remove_favorite_author))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) fn parse_date(field: &str, value: &str) -> Result<String, AppError> {
    value
        .trim()
        .parse::<Date>()
        .map(|date| date.to_string())
        .map_err(|_| AppError::field(field, "Date has wrong format. Use YYYY-MM-DD."))
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct Detail {
    pub detail: &'static str,
}

#[cfg(test)]
mod tests;
