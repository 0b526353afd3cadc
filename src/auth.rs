use std::sync::Arc;

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    db::now_sec,
    entities::user,
    error::{AppError, AppResult},
    models::Role,
    store::{accounts, spectators},
};

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 200;

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Please enter your password".to_string());
    }
    if password.chars().count() > PASSWORD_MAX_LEN {
        return Err("Your password cannot exceed 200 characters.".to_string());
    }
    if password.chars().count() < PASSWORD_MIN_LEN || !password.chars().any(|c| c.is_ascii_digit())
    {
        return Err(
            "Your password must contain at least eight characters, one number and one letter."
                .to_string(),
        );
    }
    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hash password: {e}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    if stored == accounts::UNUSABLE_PASSWORD {
        return false;
    }
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub kind: TokenKind,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> AppResult<i32> {
        self.sub.parse().map_err(|_| AppError::Unauthorized)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl_minutes: i64, refresh_ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_seconds: access_ttl_minutes.saturating_mul(60),
            refresh_ttl_seconds: refresh_ttl_days.saturating_mul(86_400),
        }
    }

    pub fn issue(&self, user: &user::Model, kind: TokenKind) -> AppResult<String> {
        let now = now_sec();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl_seconds,
            TokenKind::Refresh => self.refresh_ttl_seconds,
        };
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.clone(),
            kind,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now,
            exp: now.saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::Error::new(e).context("encode token")))
    }

    pub fn issue_pair(&self, user: &user::Model) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access: self.issue(user, TokenKind::Access)?,
            refresh: self.issue(user, TokenKind::Refresh)?,
        })
    }

    pub fn verify(&self, token: &str, expected: TokenKind) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|err| {
                tracing::debug!(error = %err, "rejected token");
                AppError::Unauthorized
            })?;
        if data.claims.kind != expected {
            return Err(AppError::Unauthorized);
        }
        Ok(data.claims)
    }
}

/// Authorization rules evaluated by handlers before they act.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    Authenticated,
    Spectator,
    Staff,
}

impl Access {
    pub fn allows(self, user: &user::Model) -> bool {
        match self {
            Access::Authenticated => true,
            Access::Spectator => Role::from_db(&user.role) == Some(Role::Spectator),
            Access::Staff => user.is_staff,
        }
    }
}

/// The account behind a valid bearer access token.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub user::Model);

impl CurrentUser {
    pub fn require(&self, access: Access) -> AppResult<&user::Model> {
        if access.allows(&self.0) { Ok(&self.0) } else { Err(AppError::forbidden()) }
    }

    /// Spectator profile id of the current account.
    pub async fn spectator_id(&self, state: &AppState) -> AppResult<i32> {
        let user = self.require(Access::Spectator)?;
        spectators::find(&state.db, user.id)
            .await?
            .map(|s| s.user_id)
            .ok_or_else(AppError::forbidden)
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let claims = state.tokens.verify(token.trim(), TokenKind::Access)?;
        let user = accounts::find_by_id(&state.db, claims.user_id()?)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, is_staff: bool) -> user::Model {
        user::Model {
            id: 12,
            email: "u@example.com".to_string(),
            username: "u@example.com".to_string(),
            first_name: "U".to_string(),
            last_name: "Ser".to_string(),
            role: role.as_str().to_string(),
            password: accounts::UNUSABLE_PASSWORD.to_string(),
            date_of_birth: None,
            is_staff,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("abcdefg1").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("no-digits-here").is_err());
        assert!(validate_password("").is_err());
        assert!(validate_password(&format!("{}1", "a".repeat(200))).is_err());
    }

    #[test]
    fn hashed_password_verifies_only_with_original() {
        let hash = hash_password("secret123").unwrap();
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("secret124", &hash));
        assert!(!verify_password("anything", accounts::UNUSABLE_PASSWORD));
    }

    #[test]
    fn refresh_tokens_are_not_access_tokens() {
        let tokens = TokenService::new("test-secret", 5, 1);
        let account = user(Role::Spectator, false);
        let pair = tokens.issue_pair(&account).unwrap();

        let claims = tokens.verify(&pair.access, TokenKind::Access).unwrap();
        assert_eq!(claims.user_id().unwrap(), 12);
        assert_eq!(claims.role, "SPECTATOR");
        assert!(tokens.verify(&pair.refresh, TokenKind::Access).is_err());
        assert!(tokens.verify(&pair.access, TokenKind::Refresh).is_err());
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let account = user(Role::Spectator, false);
        let token = TokenService::new("one", 5, 1).issue(&account, TokenKind::Access).unwrap();
        assert!(TokenService::new("two", 5, 1).verify(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn huge_lifetimes_saturate_instead_of_overflowing() {
        let tokens = TokenService::new("test-secret", i64::MAX, i64::MAX);
        let account = user(Role::Spectator, false);
        let pair = tokens.issue_pair(&account).unwrap();

        let claims = tokens.verify(&pair.refresh, TokenKind::Refresh).unwrap();
        assert_eq!(claims.exp, i64::MAX);
        assert!(tokens.verify(&pair.access, TokenKind::Access).is_ok());
    }

    #[test]
    fn access_rules() {
        let spectator = user(Role::Spectator, false);
        let author = user(Role::Author, false);
        let admin = user(Role::Author, true);

        assert!(Access::Spectator.allows(&spectator));
        assert!(!Access::Spectator.allows(&author));
        assert!(!Access::Staff.allows(&spectator));
        assert!(Access::Staff.allows(&admin));
        assert!(Access::Authenticated.allows(&author));
    }
}
