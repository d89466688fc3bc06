use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    #[sea_orm(string_value = "walk")]
    Walk,
    #[sea_orm(string_value = "play")]
    Play,
    #[sea_orm(string_value = "training")]
    Training,
    #[sea_orm(string_value = "visit")]
    Visit,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub dog_id: i32,
    pub kind: ActivityKind,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Option<Time>,
    pub operator_id: i32,
    #[sea_orm(column_type = "Text")]
    pub note: String,
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
    #[sea_orm(
        belongs_to = "super::operator::Entity",
        from = "Column::OperatorId",
        to = "super::operator::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Operator,
}

impl Related<super::dog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dog.def()
    }
}

impl Related<super::operator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
