use axum::{extract::Extension, response::Html};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde_json::json;

use super::dogs::{shelter_name, shelter_names};
use super::session::Session;
use crate::entities::{
    adoption_request::{self, AdoptionStatus},
    dog::{self, DogStatus},
    AdoptionRequest, Dog,
};
use crate::error::AppResult;
use crate::services::today;
use crate::views::{self, Templates};

const HOME_LATEST_DOGS: u64 = 6;

pub async fn home(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
) -> AppResult<Html<String>> {
    let today = today();
    let shelters = shelter_names(&db).await?;
    let available = Dog::find().filter(dog::Column::Status.eq(DogStatus::Available));

    let latest = available
        .clone()
        .order_by_desc(dog::Column::IntakeDate)
        .order_by_desc(dog::Column::Id)
        .limit(HOME_LATEST_DOGS)
        .all(&db)
        .await?;
    let available_count = available.count(&db).await?;
    let dogs_total = Dog::find().count(&db).await?;
    let completed = AdoptionRequest::find()
        .filter(adoption_request::Column::Status.eq(AdoptionStatus::Completed))
        .count(&db)
        .await?;
    let in_progress = AdoptionRequest::find()
        .filter(
            adoption_request::Column::Status
                .is_not_in([AdoptionStatus::Completed, AdoptionStatus::Rejected]),
        )
        .count(&db)
        .await?;

    let latest: Vec<_> = latest
        .iter()
        .map(|d| views::dog_json(d, shelter_name(&shelters, d.shelter_id), today))
        .collect();
    let context = json!({
        "latest_dogs": latest,
        "shelters": shelters,
        "available_count": available_count,
        "dogs_total": dogs_total,
        "adoptions_completed": completed,
        "adoptions_in_progress": in_progress,
    });
    templates.page("home", &mut session, context)
}

pub async fn about(
    Extension(templates): Extension<Templates>,
    mut session: Session,
) -> AppResult<Html<String>> {
    templates.page("about", &mut session, json!({}))
}

pub async fn contact(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
) -> AppResult<Html<String>> {
    let shelters = shelter_names(&db).await?;
    templates.page("contact", &mut session, json!({ "shelters": shelters }))
}

pub async fn health_check() -> &'static str {
    "OK"
}
