use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000001_create_accounts::{Author, Spectator};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Film::Table)
                    .if_not_exists()
                    .col(pk_auto(Film::Id))
                    .col(string_len(Film::Title, 200))
                    .col(text(Film::Description).default(""))
                    .col(string_null(Film::ReleaseDate))
                    .col(string_len(Film::Status, 20).default("RELEASED"))
                    .col(integer_null(Film::TmdbId).unique_key())
                    .col(big_integer_null(Film::Budget))
                    .col(big_integer_null(Film::Revenue))
                    .col(big_integer(Film::CreatedAt))
                    .col(big_integer(Film::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_film_release_date")
                    .table(Film::Table)
                    .col(Film::ReleaseDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FilmAuthor::Table)
                    .if_not_exists()
                    .col(integer(FilmAuthor::FilmId))
                    .col(integer(FilmAuthor::AuthorId))
                    .primary_key(Index::create().col(FilmAuthor::FilmId).col(FilmAuthor::AuthorId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_film_author_film")
                            .from(FilmAuthor::Table, FilmAuthor::FilmId)
                            .to(Film::Table, Film::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_film_author_author")
                            .from(FilmAuthor::Table, FilmAuthor::AuthorId)
                            .to(Author::Table, Author::UserId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FavoriteFilm::Table)
                    .if_not_exists()
                    .col(integer(FavoriteFilm::SpectatorId))
                    .col(integer(FavoriteFilm::FilmId))
                    .primary_key(
                        Index::create().col(FavoriteFilm::SpectatorId).col(FavoriteFilm::FilmId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorite_film_spectator")
                            .from(FavoriteFilm::Table, FavoriteFilm::SpectatorId)
                            .to(Spectator::Table, Spectator::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorite_film_film")
                            .from(FavoriteFilm::Table, FavoriteFilm::FilmId)
                            .to(Film::Table, Film::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FavoriteAuthor::Table)
                    .if_not_exists()
                    .col(integer(FavoriteAuthor::SpectatorId))
                    .col(integer(FavoriteAuthor::AuthorId))
                    .primary_key(
                        Index::create()
                            .col(FavoriteAuthor::SpectatorId)
                            .col(FavoriteAuthor::AuthorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorite_author_spectator")
                            .from(FavoriteAuthor::Table, FavoriteAuthor::SpectatorId)
                            .to(Spectator::Table, Spectator::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorite_author_author")
                            .from(FavoriteAuthor::Table, FavoriteAuthor::AuthorId)
                            .to(Author::Table, Author::UserId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(FavoriteAuthor::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(FavoriteFilm::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(FilmAuthor::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Film::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Film {
    Table,
    Id,
    Title,
    Description,
    ReleaseDate,
    Status,
    TmdbId,
    Budget,
    Revenue,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FilmAuthor {
    Table,
    FilmId,
    AuthorId,
}

#[derive(DeriveIden)]
enum FavoriteFilm {
    Table,
    SpectatorId,
    FilmId,
}

#[derive(DeriveIden)]
enum FavoriteAuthor {
    Table,
    SpectatorId,
    AuthorId,
}
