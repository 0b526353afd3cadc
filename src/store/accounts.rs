use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};

use crate::{db::now_sec, entities::user, models::Role};

/// Password value for accounts that exist only to back an author record.
pub const UNUSABLE_PASSWORD: &str = "!";

#[derive(Clone, Debug)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub password_hash: String,
    pub date_of_birth: Option<String>,
    pub is_staff: bool,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find_by_id(id).one(conn).await
}

pub async fn find_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find().filter(user::Column::Username.eq(username)).one(conn).await
}

pub async fn find_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(conn)
        .await
}

pub async fn create<C: ConnectionTrait>(conn: &C, account: NewAccount) -> Result<user::Model, DbErr> {
    let now = now_sec();
    user::ActiveModel {
        id: Default::default(),
        email: Set(normalize_email(&account.email)),
        username: Set(account.username),
        first_name: Set(account.first_name),
        last_name: Set(account.last_name),
        role: Set(account.role.as_str().to_string()),
        password: Set(account.password_hash),
        date_of_birth: Set(account.date_of_birth),
        is_staff: Set(account.is_staff),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

/// Returns the account with `username`, creating it from `defaults` when
/// absent. Existing accounts are returned untouched.
pub async fn get_or_create<C, E>(
    conn: &C,
    username: &str,
    defaults: impl FnOnce() -> Result<NewAccount, E>,
) -> Result<(user::Model, bool), E>
where
    C: ConnectionTrait,
    E: From<DbErr>,
{
    if let Some(existing) = find_by_username(conn, username).await? {
        return Ok((existing, false));
    }
    let account = defaults()?;
    Ok((create(conn, account).await?, true))
}

#[derive(Clone, Debug, Default)]
pub struct AccountChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub async fn update<C: ConnectionTrait>(
    conn: &C,
    account: user::Model,
    changes: AccountChanges,
) -> Result<user::Model, DbErr> {
    let mut active: user::ActiveModel = account.into();
    if let Some(email) = changes.email {
        active.email = Set(normalize_email(&email));
    }
    if let Some(username) = changes.username {
        active.username = Set(username);
    }
    if let Some(first_name) = changes.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = changes.last_name {
        active.last_name = Set(last_name);
    }
    active.updated_at = Set(now_sec());
    active.update(conn).await
}

pub async fn delete<C: ConnectionTrait>(conn: &C, id: i32) -> Result<u64, DbErr> {
    Ok(user::Entity::delete_by_id(id).exec(conn).await?.rows_affected)
}
