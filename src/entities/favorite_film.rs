use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "favorite_film")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub spectator_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub film_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::spectator::Entity",
        from = "Column::SpectatorId",
        to = "super::spectator::Column::UserId",
        on_delete = "Cascade"
    )]
    Spectator,
    #[sea_orm(
        belongs_to = "super::film::Entity",
        from = "Column::FilmId",
        to = "super::film::Column::Id",
        on_delete = "Cascade"
    )]
    Film,
}

impl Related<super::film::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Film.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
