use axum::{
    extract::{Extension, Form, Path, Query},
    response::{Html, Redirect},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde_json::json;

use super::session::{CurrentOperator, Level, Session};
use crate::entities::{adoption_request::AdoptionStatus, parse_choice};
use crate::error::{AppError, AppResult};
use crate::services::{
    adoption::{self, TransitionError, TransitionRequest},
    catalog::ManageAdoptionsFilter,
    pagination::{self, STAFF_PAGE_SIZE},
    today,
};
use crate::views::{self, Templates};

pub async fn list(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
    Query(filter): Query<ManageAdoptionsFilter>,
) -> AppResult<Html<String>> {
    let page = pagination::fetch_page(
        &db,
        filter.query(),
        STAFF_PAGE_SIZE,
        pagination::page_number(&filter.page),
    )
    .await?
    .map(|(request, dog)| views::adoption_json(&request, dog.as_ref()));

    let sort_options: Vec<_> = [
        ("-request_date", "Newest requests"),
        ("request_date", "Oldest requests"),
        ("status", "Status"),
        ("last_name", "Adopter A-Z"),
        ("-last_name", "Adopter Z-A"),
    ]
    .iter()
    .map(|(value, label)| json!({"value": value, "label": label, "selected": *value == filter.sort}))
    .collect();

    let context = json!({
        "filter": filter,
        "query": pagination::query_without_page(&filter),
        "page": page,
        "statuses": views::choices::<AdoptionStatus>(&filter.status),
        "sort_options": sort_options,
        "today": today().format("%Y-%m-%d").to_string(),
    });
    templates.page("manage_adoptions", &mut session, context)
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct StatusChange {
    status: String,
    completion_date: String,
    notes: String,
}

pub async fn change_status(
    Extension(db): Extension<DatabaseConnection>,
    Extension(operator): Extension<CurrentOperator>,
    mut session: Session,
    Path(request_id): Path<i32>,
    Form(change): Form<StatusChange>,
) -> AppResult<Redirect> {
    let back = Redirect::to("/manage/adoptions");

    let Some(target) = parse_choice::<AdoptionStatus>(&change.status) else {
        session.flash(Level::Error, "Choose a valid status.");
        return Ok(back);
    };
    let completion_date = match change.completion_date.trim() {
        "" => None,
        raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                session.flash(Level::Error, format!("Invalid completion date {raw:?}."));
                return Ok(back);
            }
        },
    };

    tracing::Span::current()
        .record("table", "adoption_requests")
        .record("action", "transition_adoption")
        .record("operator_id", operator.id);

    let request = TransitionRequest {
        target,
        completion_date,
        notes: Some(change.notes),
        operator_id: operator.id,
    };
    match adoption::transition(&db, request_id, request, today()).await {
        Ok(updated) => {
            tracing::Span::current()
                .record("dog_id", updated.dog_id)
                .record("business_event", "Adoption request status changed");
            if updated.status == AdoptionStatus::Completed {
                crate::metrics::refresh_dog_gauges(&db).await;
            }
            session.flash(
                Level::Success,
                format!(
                    "Request from {} {} is now {}.",
                    updated.adopter_first_name,
                    updated.adopter_last_name,
                    updated.status.label().to_lowercase()
                ),
            );
            Ok(back)
        }
        Err(TransitionError::NotFound) => Err(AppError::NotFound("Adoption request")),
        Err(e @ TransitionError::Illegal { .. }) => {
            tracing::Span::current().record("error", "illegal_transition");
            session.flash(Level::Error, e.to_string());
            Ok(back)
        }
        Err(TransitionError::Database(e)) => Err(e.into()),
    }
}
