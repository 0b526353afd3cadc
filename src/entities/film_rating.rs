use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "film_rating")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub spectator_id: i32,
    pub film_id: i32,
    pub note: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
