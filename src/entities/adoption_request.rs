use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum AdoptionStatus {
    #[sea_orm(string_value = "requested")]
    Requested,
    #[sea_orm(string_value = "under_review")]
    UnderReview,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl AdoptionStatus {
    pub fn label(self) -> &'static str {
        match self {
            AdoptionStatus::Requested => "Requested",
            AdoptionStatus::UnderReview => "Under review",
            AdoptionStatus::Approved => "Approved",
            AdoptionStatus::Completed => "Completed",
            AdoptionStatus::Rejected => "Rejected",
        }
    }

    /// Statuses an operator may move a request to from `self`.
    pub fn next_allowed(self) -> &'static [AdoptionStatus] {
        use AdoptionStatus::*;
        match self {
            Requested => &[UnderReview, Rejected],
            UnderReview => &[Approved, Rejected],
            Approved => &[Completed, Rejected],
            Completed | Rejected => &[],
        }
    }

    pub fn can_become(self, target: AdoptionStatus) -> bool {
        self.next_allowed().contains(&target)
    }

    pub fn is_open(self) -> bool {
        matches!(
            self,
            AdoptionStatus::Requested | AdoptionStatus::UnderReview | AdoptionStatus::Approved
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum HousingType {
    #[sea_orm(string_value = "apartment")]
    Apartment,
    #[sea_orm(string_value = "house_with_garden")]
    HouseWithGarden,
    #[sea_orm(string_value = "rural_house")]
    RuralHouse,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Experience {
    #[sea_orm(string_value = "none")]
    #[serde(rename = "none")]
    Novice,
    #[sea_orm(string_value = "little")]
    #[serde(rename = "little")]
    Little,
    #[sea_orm(string_value = "moderate")]
    #[serde(rename = "moderate")]
    Moderate,
    #[sea_orm(string_value = "extensive")]
    #[serde(rename = "extensive")]
    Extensive,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "adoption_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub tracking_code: Option<String>,
    pub dog_id: i32,
    pub adopter_first_name: String,
    pub adopter_last_name: String,
    pub adopter_email: String,
    pub adopter_phone: String,
    pub adopter_address: String,
    pub housing_type: HousingType,
    pub experience: Experience,
    pub has_children: bool,
    pub has_other_animals: bool,
    #[sea_orm(column_type = "Text")]
    pub other_animals_description: String,
    pub email_updates: bool,
    pub sms_updates: bool,
    pub terms_accepted: bool,
    pub request_date: Date,
    pub completion_date: Option<Date>,
    pub status: AdoptionStatus,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    pub operator_id: Option<i32>,
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
        on_delete = "SetNull"
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
