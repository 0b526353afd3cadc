use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set, sea_query::OnConflict};

use crate::{db::now_sec, entities::revoked_token};

pub async fn revoke<C: ConnectionTrait>(conn: &C, jti: &str, expires_at: i64) -> Result<(), DbErr> {
    let row = revoked_token::ActiveModel { jti: Set(jti.to_string()), expires_at: Set(expires_at) };
    revoked_token::Entity::insert(row)
        .on_conflict(OnConflict::column(revoked_token::Column::Jti).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

pub async fn is_revoked<C: ConnectionTrait>(conn: &C, jti: &str) -> Result<bool, DbErr> {
    Ok(revoked_token::Entity::find_by_id(jti.to_string()).one(conn).await?.is_some())
}

/// Drops revocations for tokens that have expired anyway.
pub async fn purge_expired<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    let result = revoked_token::Entity::delete_many()
        .filter(revoked_token::Column::ExpiresAt.lt(now_sec()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
