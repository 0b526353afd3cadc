use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(pk_auto(User::Id))
                    .col(string_uniq(User::Email))
                    .col(string_uniq(User::Username))
                    .col(string(User::FirstName))
                    .col(string(User::LastName))
                    .col(string_len(User::Role, 20).default("SPECTATOR"))
                    .col(string_len(User::Password, 200))
                    .col(string_null(User::DateOfBirth))
                    .col(boolean(User::IsStaff).default(false))
                    .col(big_integer(User::CreatedAt))
                    .col(big_integer(User::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Author::Table)
                    .if_not_exists()
                    .col(integer(Author::UserId).primary_key())
                    .col(integer_null(Author::TmdbId).unique_key())
                    .col(double(Author::Popularity).default(0.0))
                    .col(string_null(Author::Website))
                    .col(string_null(Author::DeathDate))
                    .col(integer(Author::Gender).default(0))
                    .col(string_len_null(Author::Department, 200))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_author_user")
                            .from(Author::Table, Author::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Spectator::Table)
                    .if_not_exists()
                    .col(integer(Spectator::UserId).primary_key())
                    .col(text_null(Spectator::Bio))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_spectator_user")
                            .from(Spectator::Table, Spectator::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Spectator::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Author::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum User {
    Table,
    Id,
    Email,
    Username,
    FirstName,
    LastName,
    Role,
    Password,
    DateOfBirth,
    IsStaff,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Author {
    Table,
    UserId,
    TmdbId,
    Popularity,
    Website,
    DeathDate,
    Gender,
    Department,
}

#[derive(DeriveIden)]
pub(crate) enum Spectator {
    Table,
    UserId,
    Bio,
}
