use sea_orm_migration::{prelude::*, schema::*};

use crate::{
    m20250301_000001_create_accounts::{Author, Spectator},
    m20250301_000002_create_films::Film,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FilmRating::Table)
                    .if_not_exists()
                    .col(pk_auto(FilmRating::Id))
                    .col(integer(FilmRating::SpectatorId))
                    .col(integer(FilmRating::FilmId))
                    .col(integer(FilmRating::Note).check(Expr::col(FilmRating::Note).between(1, 5)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_film_rating_spectator")
                            .from(FilmRating::Table, FilmRating::SpectatorId)
                            .to(Spectator::Table, Spectator::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_film_rating_film")
                            .from(FilmRating::Table, FilmRating::FilmId)
                            .to(Film::Table, Film::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_film_rating_unique")
                    .table(FilmRating::Table)
                    .col(FilmRating::SpectatorId)
                    .col(FilmRating::FilmId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuthorRating::Table)
                    .if_not_exists()
                    .col(pk_auto(AuthorRating::Id))
                    .col(integer(AuthorRating::SpectatorId))
                    .col(integer(AuthorRating::AuthorId))
                    .col(
                        integer(AuthorRating::Note)
                            .check(Expr::col(AuthorRating::Note).between(1, 10)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_author_rating_spectator")
                            .from(AuthorRating::Table, AuthorRating::SpectatorId)
                            .to(Spectator::Table, Spectator::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_author_rating_author")
                            .from(AuthorRating::Table, AuthorRating::AuthorId)
                            .to(Author::Table, Author::UserId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_author_rating_unique")
                    .table(AuthorRating::Table)
                    .col(AuthorRating::SpectatorId)
                    .col(AuthorRating::AuthorId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AuthorRating::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(FilmRating::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum FilmRating {
    Table,
    Id,
    SpectatorId,
    FilmId,
    Note,
}

#[derive(DeriveIden)]
enum AuthorRating {
    Table,
    Id,
    SpectatorId,
    AuthorId,
    Note,
}
