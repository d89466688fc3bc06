//! Per-dog staff logs: health records and activities.

use axum::{
    extract::{Extension, Form, Path},
    response::{Html, Redirect},
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryOrder, Set};
use serde_json::json;

use super::session::{CurrentOperator, Level, Session};
use crate::entities::{
    activity::{self, ActivityKind},
    dog, health_record, parse_choice, Activity, Choice, Dog, HealthRecord, Operator,
};
use crate::error::{AppError, AppResult};
use crate::services::today;
use crate::views::{self, Templates};

async fn find_dog(db: &DatabaseConnection, dog_id: i32) -> AppResult<dog::Model> {
    Dog::find_by_id(dog_id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("Dog"))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

pub async fn health_records(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
    Path(dog_id): Path<i32>,
) -> AppResult<Html<String>> {
    let dog = find_dog(&db, dog_id).await?;
    let records = dog
        .find_related(HealthRecord)
        .order_by_desc(health_record::Column::Date)
        .order_by_desc(health_record::Column::Id)
        .all(&db)
        .await?;

    let context = json!({
        "dog": views::dog_json(&dog, None, today()),
        "records": records,
        "today": today().format("%Y-%m-%d").to_string(),
    });
    templates.page("health", &mut session, context)
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct HealthRecordForm {
    date: String,
    intervention_type: String,
    description: String,
    veterinarian: String,
    prescribed_medications: String,
    next_checkup: String,
}

pub async fn add_health_record(
    Extension(db): Extension<DatabaseConnection>,
    mut session: Session,
    Path(dog_id): Path<i32>,
    Form(form): Form<HealthRecordForm>,
) -> AppResult<Redirect> {
    let dog = find_dog(&db, dog_id).await?;
    let back = Redirect::to(&format!("/manage/dogs/{}/health", dog.id));

    let date = match form.date.trim() {
        "" => today(),
        raw => match parse_date(raw) {
            Some(date) => date,
            None => {
                session.flash(Level::Error, format!("Invalid date {raw:?}."));
                return Ok(back);
            }
        },
    };
    let next_checkup = match form.next_checkup.trim() {
        "" => None,
        raw => match parse_date(raw) {
            Some(date) => Some(date),
            None => {
                session.flash(Level::Error, format!("Invalid next checkup date {raw:?}."));
                return Ok(back);
            }
        },
    };
    if form.intervention_type.trim().is_empty() {
        session.flash(Level::Error, "Intervention type is required.");
        return Ok(back);
    }

    let record = health_record::ActiveModel {
        dog_id: Set(dog.id),
        date: Set(date),
        intervention_type: Set(form.intervention_type.trim().to_string()),
        description: Set(form.description.trim().to_string()),
        veterinarian: Set(form.veterinarian.trim().to_string()),
        prescribed_medications: Set(form.prescribed_medications.trim().to_string()),
        next_checkup: Set(next_checkup),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    tracing::Span::current()
        .record("table", "health_records")
        .record("action", "add_health_record")
        .record("dog_id", dog.id)
        .record("business_event", "Health record added");
    tracing::debug!(record_id = record.id, "Health record stored");

    session.flash(Level::Success, "Health record added.");
    Ok(back)
}

pub async fn activities(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
    Path(dog_id): Path<i32>,
) -> AppResult<Html<String>> {
    let dog = find_dog(&db, dog_id).await?;
    let entries = dog
        .find_related(Activity)
        .find_also_related(Operator)
        .order_by_desc(activity::Column::Date)
        .order_by_desc(activity::Column::StartTime)
        .all(&db)
        .await?;

    let context = json!({
        "dog": views::dog_json(&dog, None, today()),
        "activities": entries
            .iter()
            .map(|(entry, operator)| json!({
                "activity": entry,
                "kind_label": entry.kind.label(),
                "operator": operator.as_ref().map(|o| o.username.as_str()),
            }))
            .collect::<Vec<_>>(),
        "kinds": views::choices::<ActivityKind>("walk"),
        "today": today().format("%Y-%m-%d").to_string(),
    });
    templates.page("activities", &mut session, context)
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ActivityForm {
    kind: String,
    date: String,
    start_time: String,
    end_time: String,
    note: String,
}

/// Logs an activity for the signed-in operator.
pub async fn add_activity(
    Extension(db): Extension<DatabaseConnection>,
    Extension(operator): Extension<CurrentOperator>,
    mut session: Session,
    Path(dog_id): Path<i32>,
    Form(form): Form<ActivityForm>,
) -> AppResult<Redirect> {
    let dog = find_dog(&db, dog_id).await?;
    let back = Redirect::to(&format!("/manage/dogs/{}/activities", dog.id));

    let Some(kind) = parse_choice::<ActivityKind>(&form.kind) else {
        session.flash(Level::Error, "Choose an activity type.");
        return Ok(back);
    };
    let date = match form.date.trim() {
        "" => today(),
        raw => match parse_date(raw) {
            Some(date) => date,
            None => {
                session.flash(Level::Error, format!("Invalid date {raw:?}."));
                return Ok(back);
            }
        },
    };
    let Some(start_time) = parse_time(&form.start_time) else {
        session.flash(Level::Error, "Start time is required (HH:MM).");
        return Ok(back);
    };
    let end_time = match form.end_time.trim() {
        "" => None,
        raw => match parse_time(raw) {
            Some(end) if end >= start_time => Some(end),
            _ => {
                session.flash(Level::Error, "End time must be a time after the start.");
                return Ok(back);
            }
        },
    };

    activity::ActiveModel {
        dog_id: Set(dog.id),
        kind: Set(kind),
        date: Set(date),
        start_time: Set(start_time),
        end_time: Set(end_time),
        operator_id: Set(operator.id),
        note: Set(form.note.trim().to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    tracing::Span::current()
        .record("table", "activities")
        .record("action", "log_activity")
        .record("dog_id", dog.id)
        .record("operator_id", operator.id)
        .record("business_event", "Activity logged");

    session.flash(Level::Success, format!("{} logged for {}.", kind.label(), dog.name));
    Ok(back)
}
