//! Fixtures for unit tests: a migrated in-memory SQLite database and
//! minimal rows to hang assertions on.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, IntoActiveModel,
    Set,
};
use sea_orm_migration::MigratorTrait;

use crate::entities::{
    adoption_request::{self, AdoptionStatus, Experience, HousingType},
    dog::{self, DogStatus, Sex},
    operator, shelter, AdoptionRequest, Dog,
};
use crate::migrator::Migrator;

pub async fn db() -> DatabaseConnection {
    // A single connection keeps every query on the same in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn intake_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

pub async fn shelter(db: &DatabaseConnection) -> shelter::Model {
    shelter::ActiveModel {
        name: Set("Canile Municipale".to_string()),
        address: Set("Via dei Cani 1".to_string()),
        city: Set("Roma".to_string()),
        phone: Set("06 000000".to_string()),
        email: Set("canile@example.com".to_string()),
        max_capacity: Set(50),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn operator(db: &DatabaseConnection, username: &str) -> operator::Model {
    operator::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(crate::api::auth::hash_password("correct horse").unwrap()),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// An available male dog with no birth date and a fixed intake date.
pub async fn dog(db: &DatabaseConnection, shelter_id: i32, name: &str) -> dog::Model {
    dog::ActiveModel {
        name: Set(name.to_string()),
        breed: Set("Meticcio".to_string()),
        birth_date: Set(None),
        intake_date: Set(intake_date()),
        sex: Set(Sex::Male),
        size: Set(None),
        weight: Set(None),
        microchip: Set(None),
        sterilized: Set(false),
        good_with_children: Set(true),
        good_with_animals: Set(true),
        description: Set(String::new()),
        status: Set(DogStatus::Available),
        shelter_id: Set(shelter_id),
        photo: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn set_status(db: &DatabaseConnection, dog_id: i32, status: DogStatus) {
    let mut active = Dog::find_by_id(dog_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .into_active_model();
    active.status = Set(status);
    active.update(db).await.unwrap();
}

pub async fn set_microchip(db: &DatabaseConnection, dog_id: i32, microchip: &str) {
    let mut active = Dog::find_by_id(dog_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .into_active_model();
    active.microchip = Set(Some(microchip.to_string()));
    active.update(db).await.unwrap();
}

/// A fresh `requested` adoption with the given tracking code. The dog is left untouched.
pub async fn adoption(
    db: &DatabaseConnection,
    dog_id: i32,
    tracking_code: &str,
) -> adoption_request::Model {
    adoption_request::ActiveModel {
        tracking_code: Set(Some(tracking_code.to_string())),
        dog_id: Set(dog_id),
        adopter_first_name: Set("Anna".to_string()),
        adopter_last_name: Set("Rossi".to_string()),
        adopter_email: Set("anna@example.com".to_string()),
        adopter_phone: Set("333 0000000".to_string()),
        adopter_address: Set("Via Roma 1".to_string()),
        housing_type: Set(HousingType::Apartment),
        experience: Set(Experience::Novice),
        has_children: Set(false),
        has_other_animals: Set(false),
        other_animals_description: Set(String::new()),
        email_updates: Set(false),
        sms_updates: Set(false),
        terms_accepted: Set(true),
        request_date: Set(intake_date()),
        completion_date: Set(None),
        status: Set(AdoptionStatus::Requested),
        notes: Set(String::new()),
        operator_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn set_adoption_status(db: &DatabaseConnection, id: i32, status: AdoptionStatus) {
    let mut active = AdoptionRequest::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .into_active_model();
    active.status = Set(status);
    active.update(db).await.unwrap();
}
