use sea_orm::{ActiveEnum, Iterable};

pub mod activity;
pub mod adoption_request;
pub mod dog;
pub mod health_record;
pub mod operator;
pub mod shelter;

pub use activity::Entity as Activity;
pub use adoption_request::Entity as AdoptionRequest;
pub use dog::Entity as Dog;
pub use health_record::Entity as HealthRecord;
pub use operator::Entity as Operator;
pub use shelter::Entity as Shelter;

/// A string-backed enum offered as a choice in forms and filters.
pub trait Choice: ActiveEnum<Value = String> + Iterable + Copy {
    fn label(self) -> &'static str;
}

impl Choice for dog::DogStatus {
    fn label(self) -> &'static str {
        use dog::DogStatus::*;
        match self {
            Available => "Available",
            InAdoption => "In adoption",
            Adopted => "Adopted",
            InCare => "In care",
            NotAdoptable => "Not adoptable",
        }
    }
}

impl Choice for dog::Sex {
    fn label(self) -> &'static str {
        match self {
            dog::Sex::Male => "Male",
            dog::Sex::Female => "Female",
        }
    }
}

impl Choice for dog::DogSize {
    fn label(self) -> &'static str {
        use dog::DogSize::*;
        match self {
            Small => "Small",
            Medium => "Medium",
            Large => "Large",
            ExtraLarge => "Extra large",
        }
    }
}

impl Choice for adoption_request::AdoptionStatus {
    fn label(self) -> &'static str {
        adoption_request::AdoptionStatus::label(self)
    }
}

impl Choice for adoption_request::HousingType {
    fn label(self) -> &'static str {
        use adoption_request::HousingType::*;
        match self {
            Apartment => "Apartment",
            HouseWithGarden => "House with garden",
            RuralHouse => "Rural house",
            Other => "Other",
        }
    }
}

impl Choice for adoption_request::Experience {
    fn label(self) -> &'static str {
        use adoption_request::Experience::*;
        match self {
            Novice => "None",
            Little => "Little",
            Moderate => "Moderate",
            Extensive => "Extensive",
        }
    }
}

impl Choice for activity::ActivityKind {
    fn label(self) -> &'static str {
        use activity::ActivityKind::*;
        match self {
            Walk => "Walk",
            Play => "Play",
            Training => "Training",
            Visit => "Visit",
            Other => "Other",
        }
    }
}

/// Parses a form or CSV value into one of the string-backed enums.
/// Blank input yields `None`.
pub fn parse_choice<T>(raw: &str) -> Option<T>
where
    T: ActiveEnum<Value = String>,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    T::try_from_value(&raw.to_string()).ok()
}
