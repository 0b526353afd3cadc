use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use super::Detail;
use crate::{
    AppState,
    auth::CurrentUser,
    error::{AppError, AppResult},
    models::{AuthorView, FilmView, RatingView},
    store::{accounts, authors, films, ratings, spectators},
};

pub async fn favorite_films(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> AppResult<Json<Vec<FilmView>>> {
    let spectator_id = current.spectator_id(&state).await?;
    let films = spectators::favorite_films(&state.db, spectator_id).await?;
    Ok(Json(films.iter().map(FilmView::from).collect()))
}

pub async fn add_favorite_film(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(film_id): Path<i32>,
) -> AppResult<Json<Detail>> {
    let spectator_id = current.spectator_id(&state).await?;
    films::find_by_id(&state.db, film_id).await?.ok_or(AppError::NotFound("film"))?;
    spectators::add_favorite_film(&state.db, spectator_id, film_id).await?;
    Ok(Json(Detail { detail: "Film added to favorites." }))
}

pub async fn remove_favorite_film(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(film_id): Path<i32>,
) -> AppResult<Json<Detail>> {
    let spectator_id = current.spectator_id(&state).await?;
    films::find_by_id(&state.db, film_id).await?.ok_or(AppError::NotFound("film"))?;
    spectators::remove_favorite_film(&state.db, spectator_id, film_id).await?;
    Ok(Json(Detail { detail: "Film removed from favorites." }))
}

pub async fn favorite_authors(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> AppResult<Json<Vec<AuthorView>>> {
    let spectator_id = current.spectator_id(&state).await?;
    let favorites = spectators::favorite_authors(&state.db, spectator_id).await?;
    let mut out = Vec::with_capacity(favorites.len());
    for author in favorites {
        if let Some(user) = accounts::find_by_id(&state.db, author.user_id).await? {
            out.push(AuthorView::new(&author, &user));
        }
    }
    Ok(Json(out))
}

pub async fn add_favorite_author(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(author_id): Path<i32>,
) -> AppResult<Json<Detail>> {
    let spectator_id = current.spectator_id(&state).await?;
    authors::find_by_id(&state.db, author_id).await?.ok_or(AppError::NotFound("author"))?;
    spectators::add_favorite_author(&state.db, spectator_id, author_id).await?;
    Ok(Json(Detail { detail: "Author added to favorites." }))
}

pub async fn remove_favorite_author(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(author_id): Path<i32>,
) -> AppResult<Json<Detail>> {
    let spectator_id = current.spectator_id(&state).await?;
    authors::find_by_id(&state.db, author_id).await?.ok_or(AppError::NotFound("author"))?;
    spectators::remove_favorite_author(&state.db, spectator_id, author_id).await?;
    Ok(Json(Detail { detail: "Author removed from favorites." }))
}

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    note: i32,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    rating: RatingView,
}

pub async fn rate_film(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(film_id): Path<i32>,
    Json(req): Json<RatingRequest>,
) -> AppResult<Json<RatingResponse>> {
    let spectator_id = current.spectator_id(&state).await?;
    films::find_by_id(&state.db, film_id).await?.ok_or(AppError::NotFound("film"))?;

    let rating = ratings::rate_film(&state.db, spectator_id, film_id, req.note).await?;
    tracing::debug!(spectator_id, film_id, note = rating.note, "film rated");
    Ok(Json(RatingResponse {
        rating: RatingView {
            id: rating.id,
            spectator: rating.spectator_id,
            film: Some(rating.film_id),
            author: None,
            note: rating.note,
        },
    }))
}

pub async fn rate_author(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(author_id): Path<i32>,
    Json(req): Json<RatingRequest>,
) -> AppResult<Json<RatingResponse>> {
    let spectator_id = current.spectator_id(&state).await?;
    authors::find_by_id(&state.db, author_id).await?.ok_or(AppError::NotFound("author"))?;

    let rating = ratings::rate_author(&state.db, spectator_id, author_id, req.note).await?;
    tracing::debug!(spectator_id, author_id, note = rating.note, "author rated");
    Ok(Json(RatingResponse {
        rating: RatingView {
            id: rating.id,
            spectator: rating.spectator_id,
            film: None,
            author: Some(rating.author_id),
            note: rating.note,
        },
    }))
}
