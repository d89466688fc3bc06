//! Adoption request submission and the staff review state machine.

use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;

use crate::entities::{
    adoption_request::{self, AdoptionStatus, Experience, HousingType},
    dog::{self, DogStatus},
    parse_choice, AdoptionRequest, Dog,
};

use super::tracking;

/// Body of the public adoption form. Checkboxes are present only when ticked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdoptionForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub housing_type: String,
    pub experience: String,
    pub has_children: Option<String>,
    pub has_other_animals: Option<String>,
    pub other_animals_description: String,
    pub email_updates: Option<String>,
    pub sms_updates: Option<String>,
    pub terms_accepted: Option<String>,
    pub notes: String,
}

impl AdoptionForm {
    pub fn consents(&self) -> bool {
        self.terms_accepted.is_some()
    }

    fn into_active_model(
        self,
        dog_id: i32,
        tracking_code: String,
        today: NaiveDate,
    ) -> adoption_request::ActiveModel {
        adoption_request::ActiveModel {
            tracking_code: Set(Some(tracking_code)),
            dog_id: Set(dog_id),
            adopter_first_name: Set(self.first_name.trim().to_string()),
            adopter_last_name: Set(self.last_name.trim().to_string()),
            adopter_email: Set(self.email.trim().to_string()),
            adopter_phone: Set(self.phone.trim().to_string()),
            adopter_address: Set(self.address.trim().to_string()),
            housing_type: Set(parse_choice(&self.housing_type).unwrap_or(HousingType::Apartment)),
            experience: Set(parse_choice(&self.experience).unwrap_or(Experience::Novice)),
            has_children: Set(self.has_children.is_some()),
            has_other_animals: Set(self.has_other_animals.is_some()),
            other_animals_description: Set(self.other_animals_description),
            email_updates: Set(self.email_updates.is_some()),
            sms_updates: Set(self.sms_updates.is_some()),
            terms_accepted: Set(true),
            request_date: Set(today),
            completion_date: Set(None),
            status: Set(AdoptionStatus::Requested),
            notes: Set(self.notes),
            operator_id: Set(None),
            ..Default::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("You must accept the terms and conditions to submit an adoption request.")]
    ConsentMissing,
    #[error("This dog is no longer available for adoption.")]
    DogUnavailable,
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Files a request for `dog_id` and moves the dog to `in_adoption`.
///
/// The dog is claimed with a guarded update inside the same transaction as the
/// insert, so of two concurrent submissions only the first one is stored.
pub async fn submit(
    db: &DatabaseConnection,
    dog_id: i32,
    form: AdoptionForm,
    today: NaiveDate,
) -> Result<adoption_request::Model, SubmitError> {
    if !form.consents() {
        return Err(SubmitError::ConsentMissing);
    }

    let txn = db.begin().await?;

    let claimed = Dog::update_many()
        .col_expr(dog::Column::Status, Expr::value(DogStatus::InAdoption))
        .filter(dog::Column::Id.eq(dog_id))
        .filter(dog::Column::Status.eq(DogStatus::Available))
        .exec(&txn)
        .await?;
    if claimed.rows_affected == 0 {
        txn.rollback().await?;
        return Err(SubmitError::DogUnavailable);
    }

    let code = tracking::generate_unique(&txn).await?;
    let request = form.into_active_model(dog_id, code, today).insert(&txn).await?;
    txn.commit().await?;

    crate::metrics::increment_adoption_requests();
    Ok(request)
}

#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub target: AdoptionStatus,
    /// Used only when completing; `None` means today.
    pub completion_date: Option<NaiveDate>,
    /// Appended to the request notes when non-blank.
    pub notes: Option<String>,
    pub operator_id: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("Adoption request not found.")]
    NotFound,
    #[error("A request that is {} cannot become {}.", .from.label(), .to.label())]
    Illegal {
        from: AdoptionStatus,
        to: AdoptionStatus,
    },
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Moves a request to `change.target` if the review flow allows it.
///
/// Completing sets the completion date and marks the dog adopted in the same
/// transaction. No other target touches the dog.
pub async fn transition(
    db: &DatabaseConnection,
    id: i32,
    change: TransitionRequest,
    today: NaiveDate,
) -> Result<adoption_request::Model, TransitionError> {
    let txn = db.begin().await?;

    let Some(request) = AdoptionRequest::find_by_id(id).one(&txn).await? else {
        txn.rollback().await?;
        return Err(TransitionError::NotFound);
    };
    if !request.status.can_become(change.target) {
        txn.rollback().await?;
        return Err(TransitionError::Illegal {
            from: request.status,
            to: change.target,
        });
    }

    let dog_id = request.dog_id;
    let mut notes = request.notes.clone();
    if let Some(extra) = change.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        if !notes.is_empty() {
            notes.push('\n');
        }
        notes.push_str(extra);
    }

    let mut active = request.into_active_model();
    active.status = Set(change.target);
    active.operator_id = Set(Some(change.operator_id));
    active.notes = Set(notes);
    if change.target == AdoptionStatus::Completed {
        active.completion_date = Set(Some(change.completion_date.unwrap_or(today)));
    }
    let updated = active.update(&txn).await?;

    if change.target == AdoptionStatus::Completed {
        Dog::update_many()
            .col_expr(dog::Column::Status, Expr::value(DogStatus::Adopted))
            .filter(dog::Column::Id.eq(dog_id))
            .exec(&txn)
            .await?;
        crate::metrics::increment_adoptions_completed();
    }

    txn.commit().await?;
    Ok(updated)
}
