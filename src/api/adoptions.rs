//! Public adoption flow: request form, confirmation, tracking lookup and
//! the demo dogs.

use axum::{
    extract::{Extension, Form, Path},
    response::{Html, IntoResponse, Redirect, Response},
};
use sea_orm::{DatabaseConnection, EntityTrait, ModelTrait};
use serde_json::json;

use super::session::{Level, PlaceholderAdoption, Session};
use crate::entities::{
    adoption_request::{AdoptionStatus, Experience, HousingType},
    dog::DogStatus,
    AdoptionRequest, Dog, Shelter,
};
use crate::error::{AppError, AppResult};
use crate::services::{
    adoption::{self, AdoptionForm, SubmitError},
    demo, today, tracking,
};
use crate::views::{self, Templates};

fn form_choices() -> serde_json::Value {
    json!({
        "housing_types": views::choices::<HousingType>("apartment"),
        "experiences": views::choices::<Experience>("none"),
    })
}

pub async fn adopt_form(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
    Path(dog_id): Path<i32>,
) -> AppResult<Response> {
    let dog = Dog::find_by_id(dog_id)
        .one(&db)
        .await?
        .ok_or(AppError::NotFound("Dog"))?;

    if dog.status != DogStatus::Available {
        session.flash(
            Level::Warning,
            "This dog is not currently available for adoption.",
        );
        return Ok(Redirect::to("/dogs").into_response());
    }

    let shelter = dog.find_related(Shelter).one(&db).await?;
    let context = json!({
        "dog": views::dog_json(&dog, shelter.as_ref().map(|s| s.name.as_str()), today()),
        "choices": form_choices(),
    });
    Ok(templates.page("adopt", &mut session, context)?.into_response())
}

pub async fn submit(
    Extension(db): Extension<DatabaseConnection>,
    mut session: Session,
    Path(dog_id): Path<i32>,
    Form(form): Form<AdoptionForm>,
) -> AppResult<Redirect> {
    let dog = Dog::find_by_id(dog_id)
        .one(&db)
        .await?
        .ok_or(AppError::NotFound("Dog"))?;

    tracing::Span::current()
        .record("table", "adoption_requests")
        .record("action", "submit_adoption")
        .record("dog_id", dog.id);

    match adoption::submit(&db, dog.id, form, today()).await {
        Ok(request) => {
            tracing::Span::current()
                .record("business_event", "Adoption request submitted successfully");
            crate::metrics::refresh_dog_gauges(&db).await;

            session.flash(
                Level::Success,
                format!(
                    "Your adoption request for {} has been sent. Your tracking code is {}. We will contact you soon!",
                    dog.name,
                    request.tracking_code.as_deref().unwrap_or_default()
                ),
            );
            Ok(Redirect::to(&format!(
                "/adoptions/{}/confirmation",
                request.id
            )))
        }
        Err(SubmitError::ConsentMissing) => {
            tracing::Span::current().record("error", "consent_missing");
            session.flash(Level::Error, SubmitError::ConsentMissing.to_string());
            Ok(Redirect::to(&format!("/dogs/{dog_id}/adopt")))
        }
        Err(SubmitError::DogUnavailable) => {
            tracing::Span::current().record("error", "dog_unavailable");
            session.flash(Level::Warning, SubmitError::DogUnavailable.to_string());
            Ok(Redirect::to("/dogs"))
        }
        Err(SubmitError::Database(e)) => Err(e.into()),
    }
}

pub async fn confirmation(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
    Path(request_id): Path<i32>,
) -> AppResult<Html<String>> {
    let (request, dog) = AdoptionRequest::find_by_id(request_id)
        .find_also_related(Dog)
        .one(&db)
        .await?
        .ok_or(AppError::NotFound("Adoption request"))?;

    let context = json!({ "adoption": views::adoption_json(&request, dog.as_ref()) });
    templates.page("confirmation", &mut session, context)
}

pub async fn track_form(
    Extension(templates): Extension<Templates>,
    mut session: Session,
) -> AppResult<Html<String>> {
    templates.page("track", &mut session, json!({}))
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct TrackRequest {
    tracking_code: String,
}

/// Looks a code up among stored requests, then among the demo adoption kept
/// in the session.
pub async fn track(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Templates>,
    mut session: Session,
    Form(payload): Form<TrackRequest>,
) -> AppResult<Html<String>> {
    let code = tracking::normalize(&payload.tracking_code);
    tracing::Span::current()
        .record("table", "adoption_requests")
        .record("action", "track_adoption");

    let context = if code.is_empty() {
        json!({ "error": "Enter your tracking code to check the status of your request." })
    } else if let Some(request) = tracking::find_by_code(&db, &code).await? {
        let dog = request.find_related(Dog).one(&db).await?;
        json!({
            "code": code,
            "adoption": views::adoption_json(&request, dog.as_ref()),
        })
    } else if let Some(placeholder) = session
        .placeholder_adoption()
        .filter(|p| p.tracking_code == code)
        .cloned()
    {
        json!({ "code": code, "placeholder": placeholder })
    } else {
        json!({
            "code": code,
            "error": "No request found with this code. Check that you entered it correctly.",
        })
    };

    templates.page("track", &mut session, context)
}

pub async fn demo_detail(
    Extension(templates): Extension<Templates>,
    mut session: Session,
    Path(demo_id): Path<i32>,
) -> AppResult<Response> {
    let Some(dog) = demo::find(demo_id) else {
        session.flash(Level::Warning, "This dog does not exist.");
        return Ok(Redirect::to("/dogs/photos").into_response());
    };
    Ok(templates
        .page("demo_dog", &mut session, json!({ "dog": dog }))?
        .into_response())
}

pub async fn demo_adopt_form(
    Extension(templates): Extension<Templates>,
    mut session: Session,
    Path(demo_id): Path<i32>,
) -> AppResult<Response> {
    let Some(dog) = demo::find(demo_id) else {
        session.flash(Level::Warning, "This dog does not exist.");
        return Ok(Redirect::to("/dogs/photos").into_response());
    };
    let context = json!({ "dog": dog, "choices": form_choices() });
    Ok(templates
        .page("demo_adopt", &mut session, context)?
        .into_response())
}

/// Demo adoptions get a real, unused tracking code but are kept only in the
/// session.
pub async fn demo_submit(
    Extension(db): Extension<DatabaseConnection>,
    mut session: Session,
    Path(demo_id): Path<i32>,
    Form(form): Form<AdoptionForm>,
) -> AppResult<Redirect> {
    let Some(dog) = demo::find(demo_id) else {
        session.flash(Level::Warning, "This dog does not exist.");
        return Ok(Redirect::to("/dogs/photos"));
    };
    if !form.consents() {
        session.flash(Level::Error, SubmitError::ConsentMissing.to_string());
        return Ok(Redirect::to(&format!("/demo/dogs/{demo_id}/adopt")));
    }

    let code = tracking::generate_unique(&db).await?;
    session.set_placeholder_adoption(PlaceholderAdoption {
        dog_name: dog.name.to_string(),
        dog_breed: dog.breed.to_string(),
        adopter_first_name: form.first_name.trim().to_string(),
        adopter_last_name: form.last_name.trim().to_string(),
        adopter_email: form.email.trim().to_string(),
        adopter_phone: form.phone.trim().to_string(),
        request_date: today().format("%Y-%m-%d").to_string(),
        tracking_code: code.clone(),
        status: AdoptionStatus::Requested.label().to_string(),
        photo_url: dog.photo_url.clone(),
    });
    session.flash(
        Level::Success,
        format!(
            "Your adoption request for {} has been sent. Your tracking code is {}. We will contact you soon!",
            dog.name, code
        ),
    );

    tracing::Span::current()
        .record("action", "submit_demo_adoption")
        .record("business_event", "Demo adoption stored in session");
    Ok(Redirect::to("/dogs/photos"))
}
