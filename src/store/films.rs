use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, sea_query::OnConflict,
};

use crate::{
    db::now_sec,
    entities::{author, film, film_author, user},
    models::FilmStatus,
};

/// Film fields mirrored from an external film record.
#[derive(Clone, Debug)]
pub struct FilmFields {
    pub title: String,
    pub description: String,
    pub release_date: Option<String>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
}

pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<film::Model>, DbErr> {
    film::Entity::find_by_id(id).one(conn).await
}

pub async fn find_by_tmdb_id<C: ConnectionTrait>(
    conn: &C,
    tmdb_id: i32,
) -> Result<Option<film::Model>, DbErr> {
    film::Entity::find().filter(film::Column::TmdbId.eq(tmdb_id)).one(conn).await
}

/// Inserts or updates the film keyed by `tmdb_id`. Status and `created_at` of
/// an existing row are preserved.
pub async fn upsert_by_tmdb_id<C: ConnectionTrait>(
    conn: &C,
    tmdb_id: i32,
    fields: FilmFields,
) -> Result<(film::Model, bool), DbErr> {
    let existed = find_by_tmdb_id(conn, tmdb_id).await?.is_some();
    let now = now_sec();

    let model = film::ActiveModel {
        id: Default::default(),
        title: Set(fields.title),
        description: Set(fields.description),
        release_date: Set(fields.release_date),
        status: Set(FilmStatus::Released.as_str().to_string()),
        tmdb_id: Set(Some(tmdb_id)),
        budget: Set(fields.budget),
        revenue: Set(fields.revenue),
        created_at: Set(now),
        updated_at: Set(now),
    };

    film::Entity::insert(model)
        .on_conflict(
            OnConflict::column(film::Column::TmdbId)
                .update_columns([
                    film::Column::Title,
                    film::Column::Description,
                    film::Column::ReleaseDate,
                    film::Column::Budget,
                    film::Column::Revenue,
                    film::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let stored = find_by_tmdb_id(conn, tmdb_id)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("film with tmdb_id {tmdb_id}")))?;
    Ok((stored, !existed))
}

/// Adds `author_id` to the film's authors. Returns false when already linked.
pub async fn link_author<C: ConnectionTrait>(
    conn: &C,
    film_id: i32,
    author_id: i32,
) -> Result<bool, DbErr> {
    let link = film_author::ActiveModel { film_id: Set(film_id), author_id: Set(author_id) };
    let inserted = film_author::Entity::insert(link)
        .on_conflict(
            OnConflict::columns([film_author::Column::FilmId, film_author::Column::AuthorId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(inserted > 0)
}

pub async fn authors<C: ConnectionTrait>(
    conn: &C,
    film: &film::Model,
) -> Result<Vec<(author::Model, user::Model)>, DbErr> {
    let authors = film.find_related(author::Entity).all(conn).await?;
    let mut out = Vec::with_capacity(authors.len());
    for author in authors {
        if let Some(user) = author.find_related(user::Entity).one(conn).await? {
            out.push((author, user));
        }
    }
    Ok(out)
}

pub async fn list<C: ConnectionTrait>(conn: &C) -> Result<Vec<film::Model>, DbErr> {
    film::Entity::find().order_by_asc(film::Column::Id).all(conn).await
}

/// Films released during `year`, most recently created first.
pub async fn list_by_release_year<C: ConnectionTrait>(
    conn: &C,
    year: i16,
) -> Result<Vec<film::Model>, DbErr> {
    film::Entity::find()
        .filter(film::Column::ReleaseDate.starts_with(format!("{year:04}-")))
        .order_by_desc(film::Column::CreatedAt)
        .order_by_desc(film::Column::Id)
        .all(conn)
        .await
}

#[derive(Clone, Debug, Default)]
pub struct FilmChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<Option<String>>,
    pub status: Option<FilmStatus>,
    pub budget: Option<Option<i64>>,
    pub revenue: Option<Option<i64>>,
}

pub async fn update<C: ConnectionTrait>(
    conn: &C,
    film: film::Model,
    changes: FilmChanges,
) -> Result<film::Model, DbErr> {
    let mut active: film::ActiveModel = film.into();
    if let Some(title) = changes.title {
        active.title = Set(title);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(release_date) = changes.release_date {
        active.release_date = Set(release_date);
    }
    if let Some(status) = changes.status {
        active.status = Set(status.as_str().to_string());
    }
    if let Some(budget) = changes.budget {
        active.budget = Set(budget);
    }
    if let Some(revenue) = changes.revenue {
        active.revenue = Set(revenue);
    }
    active.updated_at = Set(now_sec());
    active.update(conn).await
}
