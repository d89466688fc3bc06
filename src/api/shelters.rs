use axum::{
    extract::{Extension, Form},
    response::{Html, Redirect},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use serde_json::json;

use super::dogs::shelter_names;
use super::session::{Level, Session};
use crate::entities::{dog, shelter, Dog};
use crate::error::AppResult;
use crate::views::Templates;

/// Shelters with their current occupancy.
pub async fn list(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
) -> AppResult<Html<String>> {
    let shelters = shelter_names(&db).await?;
    let mut rows = Vec::with_capacity(shelters.len());
    for s in &shelters {
        let dogs = Dog::find()
            .filter(dog::Column::ShelterId.eq(s.id))
            .count(&db)
            .await?;
        rows.push(json!({
            "shelter": s,
            "dogs": dogs,
            "full": dogs >= u64::try_from(s.max_capacity).unwrap_or(0),
        }));
    }
    templates.page("shelters", &mut session, json!({ "shelters": rows }))
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ShelterForm {
    name: String,
    address: String,
    city: String,
    phone: String,
    email: String,
    max_capacity: String,
}

pub async fn create(
    Extension(db): Extension<DatabaseConnection>,
    mut session: Session,
    Form(form): Form<ShelterForm>,
) -> AppResult<Redirect> {
    let back = Redirect::to("/manage/shelters");

    if form.name.trim().is_empty() {
        session.flash(Level::Error, "Name is required.");
        return Ok(back);
    }
    let Some(max_capacity) = form
        .max_capacity
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|c| *c > 0)
    else {
        session.flash(Level::Error, "Capacity must be a positive number.");
        return Ok(back);
    };

    let created = shelter::ActiveModel {
        name: Set(form.name.trim().to_string()),
        address: Set(form.address.trim().to_string()),
        city: Set(form.city.trim().to_string()),
        phone: Set(form.phone.trim().to_string()),
        email: Set(form.email.trim().to_string()),
        max_capacity: Set(max_capacity),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    tracing::Span::current()
        .record("table", "shelters")
        .record("action", "create_shelter")
        .record("business_event", "Shelter created successfully");

    session.flash(Level::Success, format!("Shelter {} created.", created.name));
    Ok(back)
}
