//! Staff-side dog maintenance: manual creation, status changes, deletion and photos.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, Set,
};
use serde::Deserialize;

use crate::entities::{
    adoption_request::{self, AdoptionStatus},
    dog::{self, DogSize, DogStatus, Sex},
    parse_choice, AdoptionRequest, Dog, Shelter,
};

/// Body of the manual dog form. Checkboxes are present only when ticked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DogForm {
    pub name: String,
    pub breed: String,
    pub birth_date: String,
    pub intake_date: String,
    pub sex: String,
    pub size: String,
    pub weight: String,
    pub microchip: String,
    pub sterilized: Option<String>,
    pub good_with_children: Option<String>,
    pub good_with_animals: Option<String>,
    pub description: String,
    pub status: String,
    pub shelter_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DogFormError {
    #[error("{0} is required.")]
    Missing(&'static str),
    #[error("Invalid {field}: {value:?}.")]
    Invalid { field: &'static str, value: String },
    #[error("Shelter {0} does not exist.")]
    UnknownShelter(i32),
    #[error("A dog with microchip {0} is already registered.")]
    DuplicateMicrochip(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

fn optional(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    (!raw.is_empty()).then_some(raw)
}

fn date_field(field: &'static str, raw: &str) -> Result<Option<NaiveDate>, DogFormError> {
    optional(raw)
        .map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| DogFormError::Invalid {
                field,
                value: value.to_string(),
            })
        })
        .transpose()
}

impl DogForm {
    fn into_active_model(self, today: NaiveDate) -> Result<dog::ActiveModel, DogFormError> {
        let name = optional(&self.name).ok_or(DogFormError::Missing("Name"))?.to_string();
        let breed = optional(&self.breed).ok_or(DogFormError::Missing("Breed"))?.to_string();
        let sex = parse_choice::<Sex>(&self.sex).ok_or_else(|| DogFormError::Invalid {
            field: "sex",
            value: self.sex.clone(),
        })?;
        let size = match optional(&self.size) {
            Some(raw) => Some(parse_choice::<DogSize>(raw).ok_or_else(|| {
                DogFormError::Invalid {
                    field: "size",
                    value: raw.to_string(),
                }
            })?),
            None => None,
        };
        let status = match optional(&self.status) {
            Some(raw) => parse_choice::<DogStatus>(raw).ok_or_else(|| DogFormError::Invalid {
                field: "status",
                value: raw.to_string(),
            })?,
            None => DogStatus::Available,
        };
        let weight = optional(&self.weight)
            .map(|raw| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|w| w.is_finite() && *w >= 0.0)
                    .ok_or_else(|| DogFormError::Invalid {
                        field: "weight",
                        value: raw.to_string(),
                    })
            })
            .transpose()?;
        let shelter_id = optional(&self.shelter_id)
            .ok_or(DogFormError::Missing("Shelter"))?
            .parse::<i32>()
            .map_err(|_| DogFormError::Invalid {
                field: "shelter",
                value: self.shelter_id.clone(),
            })?;

        Ok(dog::ActiveModel {
            name: Set(name),
            breed: Set(breed),
            birth_date: Set(date_field("birth date", &self.birth_date)?),
            intake_date: Set(date_field("intake date", &self.intake_date)?.unwrap_or(today)),
            sex: Set(sex),
            size: Set(size),
            weight: Set(weight),
            microchip: Set(optional(&self.microchip).map(str::to_string)),
            sterilized: Set(self.sterilized.is_some()),
            good_with_children: Set(self.good_with_children.is_some()),
            good_with_animals: Set(self.good_with_animals.is_some()),
            description: Set(self.description.trim().to_string()),
            status: Set(status),
            shelter_id: Set(shelter_id),
            photo: Set(None),
            ..Default::default()
        })
    }
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    form: DogForm,
    today: NaiveDate,
) -> Result<dog::Model, DogFormError> {
    let active = form.into_active_model(today)?;

    let shelter_id = *active.shelter_id.as_ref();
    if Shelter::find_by_id(shelter_id).one(db).await?.is_none() {
        return Err(DogFormError::UnknownShelter(shelter_id));
    }
    if let Some(chip) = active.microchip.as_ref() {
        if chip.chars().count() > 15 {
            return Err(DogFormError::Invalid {
                field: "microchip",
                value: chip.clone(),
            });
        }
        let taken = Dog::find()
            .filter(dog::Column::Microchip.eq(chip.as_str()))
            .count(db)
            .await?
            > 0;
        if taken {
            return Err(DogFormError::DuplicateMicrochip(chip.clone()));
        }
    }

    Ok(active.insert(db).await?)
}

/// Deletes a dog with its health records, requests and activities.
/// Returns false when there was no such dog.
pub async fn delete<C: ConnectionTrait>(db: &C, dog_id: i32) -> Result<bool, DbErr> {
    let result = Dog::delete_by_id(dog_id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Points the dog at a stored photo, returning the previous one so the caller
/// can remove the file.
pub async fn set_photo<C: ConnectionTrait>(
    db: &C,
    dog_id: i32,
    photo: String,
) -> Result<Option<Option<String>>, DbErr> {
    let Some(dog) = Dog::find_by_id(dog_id).one(db).await? else {
        return Ok(None);
    };
    let previous = dog.photo.clone();
    let mut active = dog.into_active_model();
    active.photo = Set(Some(photo));
    active.update(db).await?;
    Ok(Some(previous))
}

#[derive(Debug, thiserror::Error)]
pub enum StatusChangeError {
    #[error("Dog not found.")]
    NotFound,
    #[error("{name} has an adoption request in progress. Reject or complete it first.")]
    OpenRequest { name: String },
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Sets a dog's status by hand. A dog reserved by a request that is still
/// open keeps `in_adoption` until that request is closed.
pub async fn set_status<C: ConnectionTrait>(
    db: &C,
    dog_id: i32,
    status: DogStatus,
) -> Result<dog::Model, StatusChangeError> {
    let dog = Dog::find_by_id(dog_id)
        .one(db)
        .await?
        .ok_or(StatusChangeError::NotFound)?;
    if dog.status == status {
        return Ok(dog);
    }

    if dog.status == DogStatus::InAdoption {
        let open = AdoptionRequest::find()
            .filter(adoption_request::Column::DogId.eq(dog.id))
            .filter(adoption_request::Column::Status.is_in([
                AdoptionStatus::Requested,
                AdoptionStatus::UnderReview,
                AdoptionStatus::Approved,
            ]))
            .count(db)
            .await?;
        if open > 0 {
            return Err(StatusChangeError::OpenRequest { name: dog.name });
        }
    }

    let mut active = dog.into_active_model();
    active.status = Set(status);
    Ok(active.update(db).await?)
}
