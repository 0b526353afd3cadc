use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
    sea_query::OnConflict,
};

use crate::entities::{author, favorite_author, favorite_film, film, spectator};

pub async fn create<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    bio: Option<String>,
) -> Result<spectator::Model, DbErr> {
    spectator::ActiveModel { user_id: Set(user_id), bio: Set(bio) }.insert(conn).await
}

pub async fn find<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Option<spectator::Model>, DbErr> {
    spectator::Entity::find_by_id(user_id).one(conn).await
}

pub async fn add_favorite_film<C: ConnectionTrait>(
    conn: &C,
    spectator_id: i32,
    film_id: i32,
) -> Result<(), DbErr> {
    let row = favorite_film::ActiveModel { spectator_id: Set(spectator_id), film_id: Set(film_id) };
    favorite_film::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([favorite_film::Column::SpectatorId, favorite_film::Column::FilmId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

pub async fn remove_favorite_film<C: ConnectionTrait>(
    conn: &C,
    spectator_id: i32,
    film_id: i32,
) -> Result<(), DbErr> {
    favorite_film::Entity::delete_many()
        .filter(favorite_film::Column::SpectatorId.eq(spectator_id))
        .filter(favorite_film::Column::FilmId.eq(film_id))
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn favorite_films<C: ConnectionTrait>(
    conn: &C,
    spectator_id: i32,
) -> Result<Vec<film::Model>, DbErr> {
    let rows = favorite_film::Entity::find()
        .filter(favorite_film::Column::SpectatorId.eq(spectator_id))
        .find_also_related(film::Entity)
        .all(conn)
        .await?;
    Ok(rows.into_iter().filter_map(|(_, film)| film).collect())
}

pub async fn add_favorite_author<C: ConnectionTrait>(
    conn: &C,
    spectator_id: i32,
    author_id: i32,
) -> Result<(), DbErr> {
    let row =
        favorite_author::ActiveModel { spectator_id: Set(spectator_id), author_id: Set(author_id) };
    favorite_author::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                favorite_author::Column::SpectatorId,
                favorite_author::Column::AuthorId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

pub async fn remove_favorite_author<C: ConnectionTrait>(
    conn: &C,
    spectator_id: i32,
    author_id: i32,
) -> Result<(), DbErr> {
    favorite_author::Entity::delete_many()
        .filter(favorite_author::Column::SpectatorId.eq(spectator_id))
        .filter(favorite_author::Column::AuthorId.eq(author_id))
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn favorite_authors<C: ConnectionTrait>(
    conn: &C,
    spectator_id: i32,
) -> Result<Vec<author::Model>, DbErr> {
    let rows = favorite_author::Entity::find()
        .filter(favorite_author::Column::SpectatorId.eq(spectator_id))
        .find_also_related(author::Entity)
        .all(conn)
        .await?;
    Ok(rows.into_iter().filter_map(|(_, author)| author).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db,
        models::Role,
        store::{
            accounts::{self, NewAccount},
            films::{self, FilmFields},
        },
    };

    #[tokio::test]
    async fn favorites_are_idempotent_and_removable() {
        let db = db::memory().await;
        let user = accounts::create(
            &db,
            NewAccount {
                email: "fan@example.com".to_string(),
                username: "fan@example.com".to_string(),
                first_name: "Film".to_string(),
                last_name: "Fan".to_string(),
                role: Role::Spectator,
                password_hash: accounts::UNUSABLE_PASSWORD.to_string(),
                date_of_birth: None,
                is_staff: false,
            },
        )
        .await
        .unwrap();
        create(&db, user.id, None).await.unwrap();
        let (film, _) = films::upsert_by_tmdb_id(
            &db,
            550,
            FilmFields {
                title: "Fight Club".to_string(),
                description: String::new(),
                release_date: None,
                budget: None,
                revenue: None,
            },
        )
        .await
        .unwrap();

        add_favorite_film(&db, user.id, film.id).await.unwrap();
        add_favorite_film(&db, user.id, film.id).await.unwrap();
        let favorites = favorite_films(&db, user.id).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, film.id);

        remove_favorite_film(&db, user.id, film.id).await.unwrap();
        assert!(favorite_films(&db, user.id).await.unwrap().is_empty());
    }
}
