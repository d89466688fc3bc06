use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "health_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub dog_id: i32,
    pub date: Date,
    pub intervention_type: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub veterinarian: String,
    #[sea_orm(column_type = "Text")]
    pub prescribed_medications: String,
    pub next_checkup: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dog::Entity",
        from = "Column::DogId",
        to = "super::dog::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Dog,
}

impl Related<super::dog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
