use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};

use super::{Detail, parse_date};
use crate::{
    AppState,
    auth::{self, Access, CurrentUser, TokenKind, TokenPair},
    error::{AppError, AppResult, FieldErrors},
    models::{Role, UserView},
    store::{
        accounts::{self, NewAccount},
        spectators, tokens,
    },
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    bio: Option<String>,
    date_of_birth: Option<String>,
}

fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> String {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => v,
        Some(_) => {
            errors.entry(field.to_string()).or_default().push("This field may not be blank.".into());
            String::new()
        },
        None => {
            errors.entry(field.to_string()).or_default().push("This field is required.".into());
            String::new()
        },
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        },
        None => false,
    }
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    let mut errors = FieldErrors::new();

    let first_name = required(&mut errors, "first_name", req.first_name);
    let last_name = required(&mut errors, "last_name", req.last_name);
    let email = accounts::normalize_email(&required(&mut errors, "email", req.email));
    if !email.is_empty() {
        if !looks_like_email(&email) {
            errors.entry("email".into()).or_default().push("Enter a valid email address.".into());
        } else if accounts::find_by_email(&state.db, &email).await?.is_some() {
            errors.entry("email".into()).or_default().push("Email already exists.".into());
        }
    }

    let password = req.password.unwrap_or_default();
    if let Err(message) = auth::validate_password(&password) {
        errors.entry("password".into()).or_default().push(message);
    }

    let date_of_birth = match req.date_of_birth.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(raw) => match parse_date("date_of_birth", raw) {
            Ok(date) => Some(date),
            Err(AppError::Validation(field_errors)) => {
                errors.extend(field_errors);
                None
            },
            Err(other) => return Err(other),
        },
        None => None,
    };

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let password_hash = auth::hash_password(&password)?;
    let txn = state.db.begin().await?;
    let user = accounts::create(
        &txn,
        NewAccount {
            email: email.clone(),
            username: email,
            first_name,
            last_name,
            role: Role::Spectator,
            password_hash,
            date_of_birth,
            is_staff: false,
        },
    )
    .await?;
    spectators::create(&txn, user.id, req.bio.filter(|b| !b.is_empty())).await?;
    txn.commit().await?;

    tracing::info!(user_id = user.id, "spectator registered");
    Ok((StatusCode::CREATED, Json(UserView::from(&user))))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    id: i32,
    username: String,
    email: String,
    role: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    tokens: TokenPair,
    user: LoginUser,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = accounts::find_by_email(&state.db, &req.email)
        .await?
        .filter(|user| auth::verify_password(&req.password, &user.password))
        .ok_or(AppError::Unauthorized)?;

    if !Access::Spectator.allows(&user) {
        return Err(AppError::BadRequest("Only spectators can login for now".to_string()));
    }

    let tokens = state.tokens.issue_pair(&user)?;
    tracing::debug!(user_id = user.id, "login");
    Ok(Json(LoginResponse {
        tokens,
        user: LoginUser {
            id: user.id,
            username: user.email.clone(),
            email: user.email,
            role: user.role,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    refresh: Option<String>,
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<Detail>> {
    current.require(Access::Spectator)?;

    let Some(refresh) = req.refresh.filter(|t| !t.trim().is_empty()) else {
        return Err(AppError::BadRequest("Refresh token is required.".to_string()));
    };

    let invalid = || AppError::BadRequest("Invalid token or already blacklisted.".to_string());
    let claims = state.tokens.verify(&refresh, TokenKind::Refresh).map_err(|_| invalid())?;
    if tokens::is_revoked(&state.db, &claims.jti).await? {
        return Err(invalid());
    }

    tokens::revoke(&state.db, &claims.jti, claims.exp).await?;
    let purged = tokens::purge_expired(&state.db).await?;
    tracing::debug!(user_id = current.0.id, purged, "refresh token revoked");
    Ok(Json(Detail { detail: "Successfully logged out." }))
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    access: String,
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<AccessToken>> {
    let refresh = req.refresh.ok_or_else(|| AppError::field("refresh", "This field is required."))?;
    let claims = state.tokens.verify(&refresh, TokenKind::Refresh)?;
    if tokens::is_revoked(&state.db, &claims.jti).await? {
        return Err(AppError::Unauthorized);
    }

    let user =
        accounts::find_by_id(&state.db, claims.user_id()?).await?.ok_or(AppError::Unauthorized)?;
    Ok(Json(AccessToken { access: state.tokens.issue(&user, TokenKind::Access)? }))
}
