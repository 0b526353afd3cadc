use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use super::{double_option, parse_date};
use crate::{
    AppState,
    auth::{Access, CurrentUser},
    error::{AppError, AppResult},
    models::{AuthorView, FilmDetailView, FilmStatus, FilmView},
    store::films::{self, FilmChanges},
};

pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<FilmView>>> {
    let films = films::list(&state.db).await?;
    Ok(Json(films.iter().map(FilmView::from).collect()))
}

pub async fn by_year(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(year): Path<i16>,
) -> AppResult<Json<Vec<FilmView>>> {
    current.require(Access::Staff)?;
    let films = films::list_by_release_year(&state.db, year).await?;
    Ok(Json(films.iter().map(FilmView::from).collect()))
}

async fn detail_view(state: &AppState, id: i32) -> AppResult<FilmDetailView> {
    let film = films::find_by_id(&state.db, id).await?.ok_or(AppError::NotFound("film"))?;
    let authors = films::authors(&state.db, &film)
        .await?
        .iter()
        .map(|(author, user)| AuthorView::new(author, user))
        .collect();
    Ok(FilmDetailView { film: FilmView::from(&film), authors })
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<FilmDetailView>> {
    current.require(Access::Staff)?;
    Ok(Json(detail_view(&state, id).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct FilmUpdate {
    title: Option<String>,
    description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    release_date: Option<Option<String>>,
    status: Option<FilmStatus>,
    #[serde(default, deserialize_with = "double_option")]
    budget: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    revenue: Option<Option<i64>>,
}

impl FilmUpdate {
    fn into_changes(self) -> AppResult<FilmChanges> {
        if let Some(title) = &self.title {
            let len = title.trim().chars().count();
            if len == 0 {
                return Err(AppError::field("title", "This field may not be blank."));
            }
            if len > 200 {
                return Err(AppError::field(
                    "title",
                    "Ensure this field has no more than 200 characters.",
                ));
            }
        }
        if self.description.as_ref().is_some_and(|d| d.chars().count() > 2000) {
            return Err(AppError::field(
                "description",
                "Ensure this field has no more than 2000 characters.",
            ));
        }
        let release_date = match self.release_date {
            Some(Some(raw)) => Some(Some(parse_date("release_date", &raw)?)),
            other => other,
        };
        Ok(FilmChanges {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description,
            release_date,
            status: self.status,
            budget: self.budget,
            revenue: self.revenue,
        })
    }
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(req): Json<FilmUpdate>,
) -> AppResult<Json<FilmDetailView>> {
    current.require(Access::Staff)?;
    let film = films::find_by_id(&state.db, id).await?.ok_or(AppError::NotFound("film"))?;
    let changes = req.into_changes()?;
    let film = films::update(&state.db, film, changes).await?;
    tracing::info!(film_id = film.id, "film updated");
    Ok(Json(detail_view(&state, film.id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_clears_and_absent_keeps() {
        let update: FilmUpdate =
            serde_json::from_str(r#"{"budget": null, "status": "ARCHIVED"}"#).unwrap();
        let changes = update.into_changes().unwrap();
        assert_eq!(changes.budget, Some(None));
        assert_eq!(changes.revenue, None);
        assert_eq!(changes.status, Some(FilmStatus::Archived));
    }

    #[test]
    fn blank_title_and_bad_date_are_rejected() {
        let update = FilmUpdate { title: Some("  ".to_string()), ..Default::default() };
        assert!(matches!(update.into_changes(), Err(AppError::Validation(_))));

        let update: FilmUpdate = serde_json::from_str(r#"{"release_date": "15/10/1999"}"#).unwrap();
        assert!(matches!(update.into_changes(), Err(AppError::Validation(_))));
    }
}
