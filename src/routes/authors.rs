use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sea_orm::TransactionTrait;
use serde::Deserialize;

use super::{double_option, parse_date};
use crate::{
    AppState,
    auth::{Access, CurrentUser},
    error::{AppError, AppResult},
    models::{AuthorView, Gender},
    store::{
        accounts::{self, AccountChanges},
        authors::{self, AuthorChanges},
    },
};

pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<AuthorView>>> {
    let rows = authors::list_with_users(&state.db).await?;
    let mut out = Vec::with_capacity(rows.len());
    for (author, user) in rows {
        let count = authors::films_count(&state.db, author.user_id).await?;
        out.push(AuthorView::new(&author, &user).with_films_count(count));
    }
    Ok(Json(out))
}

async fn view(state: &AppState, id: i32) -> AppResult<AuthorView> {
    let (author, user) =
        authors::with_user(&state.db, id).await?.ok_or(AppError::NotFound("author"))?;
    let count = authors::films_count(&state.db, author.user_id).await?;
    Ok(AuthorView::new(&author, &user).with_films_count(count))
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorView>> {
    current.require(Access::Staff)?;
    Ok(Json(view(&state, id).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthorUserUpdate {
    email: Option<String>,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthorUpdate {
    user: Option<AuthorUserUpdate>,
    popularity: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    website: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    death_date: Option<Option<String>>,
    gender: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    department: Option<Option<String>>,
}

impl AuthorUpdate {
    fn into_changes(self) -> AppResult<(AccountChanges, AuthorChanges)> {
        if let Some(gender) = self.gender
            && Gender::from_code(gender).is_none()
        {
            return Err(AppError::field("gender", format!("\"{gender}\" is not a valid choice.")));
        }
        if self.department.as_ref().and_then(|d| d.as_ref()).is_some_and(|d| d.chars().count() > 200)
        {
            return Err(AppError::field(
                "department",
                "Ensure this field has no more than 200 characters.",
            ));
        }
        let death_date = match self.death_date {
            Some(Some(raw)) => Some(Some(parse_date("death_date", &raw)?)),
            other => other,
        };

        let user = self.user.unwrap_or_default();
        if user.email.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(AppError::field("user.email", "This field may not be blank."));
        }
        let account = AccountChanges {
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        };
        let author = AuthorChanges {
            popularity: self.popularity,
            website: self.website,
            death_date,
            gender: self.gender,
            department: self.department,
        };
        Ok((account, author))
    }
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(req): Json<AuthorUpdate>,
) -> AppResult<Json<AuthorView>> {
    current.require(Access::Staff)?;
    let (author, user) =
        authors::with_user(&state.db, id).await?.ok_or(AppError::NotFound("author"))?;
    let (account_changes, author_changes) = req.into_changes()?;

    if let Some(email) = &account_changes.email
        && let Some(other) = accounts::find_by_email(&state.db, email).await?
        && other.id != user.id
    {
        return Err(AppError::field("user.email", "Email already exists."));
    }
    if let Some(username) = &account_changes.username
        && let Some(other) = accounts::find_by_username(&state.db, username).await?
        && other.id != user.id
    {
        return Err(AppError::field("user.username", "A user with that username already exists."));
    }

    let txn = state.db.begin().await?;
    accounts::update(&txn, user, account_changes).await?;
    authors::update(&txn, author, author_changes).await?;
    txn.commit().await?;

    tracing::info!(author_id = id, "author updated");
    Ok(Json(view(&state, id).await?))
}

/// Deletes the author together with its account. Refused while the author
/// is credited on any film.
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    current.require(Access::Staff)?;
    let author = authors::find_by_id(&state.db, id).await?.ok_or(AppError::NotFound("author"))?;

    let count = authors::films_count(&state.db, author.user_id).await?;
    if count > 0 {
        return Err(AppError::BadRequest(format!(
            "Cannot delete the author, they have {count} films"
        )));
    }

    accounts::delete(&state.db, author.user_id).await?;
    tracing::info!(author_id = id, "author deleted");
    Ok(StatusCode::NO_CONTENT)
}
