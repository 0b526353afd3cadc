use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    /// Argon2 PHC string, or `!` for accounts that cannot log in.
    pub password: String,
    pub date_of_birth: Option<String>,
    pub is_staff: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::author::Entity")]
    Author,
    #[sea_orm(has_one = "super::spectator::Entity")]
    Spectator,
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::spectator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Spectator.def()
    }
}

impl Model {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() { self.username.clone() } else { full.to_string() }
    }
}

impl ActiveModelBehavior for ActiveModel {}
