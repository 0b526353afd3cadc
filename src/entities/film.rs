use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "film")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub release_date: Option<String>,
    pub status: String,
    #[sea_orm(unique)]
    pub tmdb_id: Option<i32>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        super::film_author::Relation::Author.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::film_author::Relation::Film.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
