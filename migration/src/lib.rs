pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_accounts;
mod m20250301_000002_create_films;
mod m20250301_000003_create_ratings;
mod m20250310_000001_create_revoked_token;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_accounts::Migration),
            Box::new(m20250301_000002_create_films::Migration),
            Box::new(m20250301_000003_create_ratings::Migration),
            Box::new(m20250310_000001_create_revoked_token::Migration),
        ]
    }
}
