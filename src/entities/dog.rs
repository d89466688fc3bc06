use chrono::Datelike;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum DogStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "in_adoption")]
    InAdoption,
    #[sea_orm(string_value = "adopted")]
    Adopted,
    #[sea_orm(string_value = "in_care")]
    InCare,
    #[sea_orm(string_value = "not_adoptable")]
    NotAdoptable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum Sex {
    #[sea_orm(string_value = "M")]
    #[serde(rename = "M")]
    Male,
    #[sea_orm(string_value = "F")]
    #[serde(rename = "F")]
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum DogSize {
    #[sea_orm(string_value = "small")]
    Small,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "large")]
    Large,
    #[sea_orm(string_value = "extra_large")]
    ExtraLarge,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "dogs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub breed: String,
    pub birth_date: Option<Date>,
    pub intake_date: Date,
    pub sex: Sex,
    pub size: Option<DogSize>,
    pub weight: Option<f64>,
    #[sea_orm(unique)]
    pub microchip: Option<String>,
    pub sterilized: bool,
    pub good_with_children: bool,
    pub good_with_animals: bool,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: DogStatus,
    pub shelter_id: i32,
    pub photo: Option<String>,
}

impl Model {
    /// Age in whole years on `today`, when the birth date is known.
    pub fn age_on(&self, today: Date) -> Option<i32> {
        self.birth_date.map(|born| {
            let before_birthday = (today.month(), today.day()) < (born.month(), born.day());
            today.year() - born.year() - i32::from(before_birthday)
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shelter::Entity",
        from = "Column::ShelterId",
        to = "super::shelter::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Shelter,
    #[sea_orm(has_many = "super::health_record::Entity")]
    HealthRecord,
    #[sea_orm(has_many = "super::adoption_request::Entity")]
    AdoptionRequest,
    #[sea_orm(has_many = "super::activity::Entity")]
    Activity,
}

impl Related<super::shelter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shelter.def()
    }
}

impl Related<super::health_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HealthRecord.def()
    }
}

impl Related<super::adoption_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdoptionRequest.def()
    }
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
