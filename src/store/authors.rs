use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TryIntoModel, sea_query::OnConflict,
};

use crate::entities::{author, film, film_author, user};

/// Author fields mirrored from an external person record.
#[derive(Clone, Debug)]
pub struct AuthorProfile {
    pub popularity: f64,
    pub website: Option<String>,
    pub death_date: Option<String>,
    pub gender: i32,
    pub department: Option<String>,
}

pub async fn find_by_id<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Option<author::Model>, DbErr> {
    author::Entity::find_by_id(user_id).one(conn).await
}

pub async fn find_by_tmdb_id<C: ConnectionTrait>(
    conn: &C,
    tmdb_id: i32,
) -> Result<Option<author::Model>, DbErr> {
    author::Entity::find().filter(author::Column::TmdbId.eq(tmdb_id)).one(conn).await
}

/// Inserts or updates the author keyed by `tmdb_id`. Returns the stored row and
/// whether it was newly created.
pub async fn upsert_by_tmdb_id<C: ConnectionTrait>(
    conn: &C,
    tmdb_id: i32,
    user_id: i32,
    profile: AuthorProfile,
) -> Result<(author::Model, bool), DbErr> {
    let existed = find_by_tmdb_id(conn, tmdb_id).await?.is_some();

    let model = author::ActiveModel {
        user_id: Set(user_id),
        tmdb_id: Set(Some(tmdb_id)),
        popularity: Set(profile.popularity),
        website: Set(profile.website),
        death_date: Set(profile.death_date),
        gender: Set(profile.gender),
        department: Set(profile.department),
    };

    author::Entity::insert(model)
        .on_conflict(
            OnConflict::column(author::Column::TmdbId)
                .update_columns([
                    author::Column::UserId,
                    author::Column::Popularity,
                    author::Column::Website,
                    author::Column::DeathDate,
                    author::Column::Gender,
                    author::Column::Department,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let stored = find_by_tmdb_id(conn, tmdb_id)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("author with tmdb_id {tmdb_id}")))?;
    Ok((stored, !existed))
}

pub async fn with_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Option<(author::Model, user::Model)>, DbErr> {
    let row = author::Entity::find_by_id(user_id)
        .find_also_related(user::Entity)
        .one(conn)
        .await?;
    Ok(row.and_then(|(author, user)| user.map(|user| (author, user))))
}

pub async fn list_with_users<C: ConnectionTrait>(
    conn: &C,
) -> Result<Vec<(author::Model, user::Model)>, DbErr> {
    let rows = author::Entity::find()
        .find_also_related(user::Entity)
        .order_by_asc(author::Column::UserId)
        .all(conn)
        .await?;
    Ok(rows.into_iter().filter_map(|(author, user)| user.map(|user| (author, user))).collect())
}

pub async fn films_count<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<u64, DbErr> {
    film_author::Entity::find()
        .filter(film_author::Column::AuthorId.eq(user_id))
        .count(conn)
        .await
}

pub async fn films<C: ConnectionTrait>(
    conn: &C,
    author: &author::Model,
) -> Result<Vec<film::Model>, DbErr> {
    author.find_related(film::Entity).all(conn).await
}

#[derive(Clone, Debug, Default)]
pub struct AuthorChanges {
    pub popularity: Option<f64>,
    pub website: Option<Option<String>>,
    pub death_date: Option<Option<String>>,
    pub gender: Option<i32>,
    pub department: Option<Option<String>>,
}

pub async fn update<C: ConnectionTrait>(
    conn: &C,
    author: author::Model,
    changes: AuthorChanges,
) -> Result<author::Model, DbErr> {
    let mut active: author::ActiveModel = author.into();
    if let Some(popularity) = changes.popularity {
        active.popularity = Set(popularity);
    }
    if let Some(website) = changes.website {
        active.website = Set(website);
    }
    if let Some(death_date) = changes.death_date {
        active.death_date = Set(death_date);
    }
    if let Some(gender) = changes.gender {
        active.gender = Set(gender);
    }
    if let Some(department) = changes.department {
        active.department = Set(department);
    }
    if !active.is_changed() {
        return active.try_into_model();
    }
    active.update(conn).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db,
        models::Role,
        store::accounts::{self, NewAccount},
    };

    async fn account(db: &sea_orm::DatabaseConnection, username: &str) -> user::Model {
        accounts::create(
            db,
            NewAccount {
                email: format!("{username}@example.com"),
                username: username.to_string(),
                first_name: "Jane".to_string(),
                last_name: "Campion".to_string(),
                role: Role::Author,
                password_hash: accounts::UNUSABLE_PASSWORD.to_string(),
                date_of_birth: None,
                is_staff: false,
            },
        )
        .await
        .unwrap()
    }

    fn profile(popularity: f64) -> AuthorProfile {
        AuthorProfile {
            popularity,
            website: None,
            death_date: None,
            gender: 1,
            department: Some("Directing".to_string()),
        }
    }

    #[tokio::test]
    async fn upsert_updates_in_place() {
        let db = db::memory().await;
        let user = account(&db, "author_42").await;

        let (first, created) = upsert_by_tmdb_id(&db, 42, user.id, profile(1.5)).await.unwrap();
        assert!(created);
        assert_eq!(first.popularity, 1.5);

        let (second, created) = upsert_by_tmdb_id(&db, 42, user.id, profile(9.0)).await.unwrap();
        assert!(!created);
        assert_eq!(second.user_id, first.user_id);
        assert_eq!(second.popularity, 9.0);
        assert_eq!(author::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deleting_the_account_removes_the_author() {
        let db = db::memory().await;
        let user = account(&db, "author_1").await;
        upsert_by_tmdb_id(&db, 1, user.id, profile(0.0)).await.unwrap();

        accounts::delete(&db, user.id).await.unwrap();
        assert!(find_by_tmdb_id(&db, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_applies_only_given_fields() {
        let db = db::memory().await;
        let user = account(&db, "author_9").await;
        let (stored, _) = upsert_by_tmdb_id(&db, 9, user.id, profile(2.0)).await.unwrap();

        let untouched = update(&db, stored.clone(), AuthorChanges::default()).await.unwrap();
        assert_eq!(untouched, stored);

        let changes = AuthorChanges {
            website: Some(Some("https://example.com".to_string())),
            department: Some(None),
            ..Default::default()
        };
        let updated = update(&db, stored, changes).await.unwrap();
        assert_eq!(updated.website.as_deref(), Some("https://example.com"));
        assert_eq!(updated.department, None);
        assert_eq!(updated.popularity, 2.0);
        assert_eq!(find_by_id(&db, user.id).await.unwrap(), Some(updated));
    }
}
