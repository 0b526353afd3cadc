use std::ops::RangeInclusive;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set, sea_query::OnConflict};

use crate::{
    entities::{author_rating, film_rating},
    error::{AppError, AppResult},
    models::{AUTHOR_NOTE_RANGE, FILM_NOTE_RANGE},
};

pub fn validate_note(note: i32, range: RangeInclusive<i32>) -> AppResult<i32> {
    if range.contains(&note) {
        Ok(note)
    } else {
        Err(AppError::field(
            "note",
            format!("note must be between {} and {}", range.start(), range.end()),
        ))
    }
}

/// Records `note` (1-5) for the film, replacing any earlier note by the same
/// spectator.
pub async fn rate_film<C: ConnectionTrait>(
    conn: &C,
    spectator_id: i32,
    film_id: i32,
    note: i32,
) -> AppResult<film_rating::Model> {
    let note = validate_note(note, FILM_NOTE_RANGE)?;
    let row = film_rating::ActiveModel {
        id: Default::default(),
        spectator_id: Set(spectator_id),
        film_id: Set(film_id),
        note: Set(note),
    };
    film_rating::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([film_rating::Column::SpectatorId, film_rating::Column::FilmId])
                .update_column(film_rating::Column::Note)
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let stored = film_rating::Entity::find()
        .filter(film_rating::Column::SpectatorId.eq(spectator_id))
        .filter(film_rating::Column::FilmId.eq(film_id))
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound("film rating".to_string()))?;
    Ok(stored)
}

/// Records `note` (1-10) for the author, replacing any earlier note by the
/// same spectator.
pub async fn rate_author<C: ConnectionTrait>(
    conn: &C,
    spectator_id: i32,
    author_id: i32,
    note: i32,
) -> AppResult<author_rating::Model> {
    let note = validate_note(note, AUTHOR_NOTE_RANGE)?;
    let row = author_rating::ActiveModel {
        id: Default::default(),
        spectator_id: Set(spectator_id),
        author_id: Set(author_id),
        note: Set(note),
    };
    author_rating::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([author_rating::Column::SpectatorId, author_rating::Column::AuthorId])
                .update_column(author_rating::Column::Note)
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let stored = author_rating::Entity::find()
        .filter(author_rating::Column::SpectatorId.eq(spectator_id))
        .filter(author_rating::Column::AuthorId.eq(author_id))
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound("author rating".to_string()))?;
    Ok(stored)
}
