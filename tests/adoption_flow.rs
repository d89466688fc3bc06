mod common;

use axum::http::StatusCode;
use sea_orm::{EntityTrait, PaginatorTrait};
use shelter_server::entities::{
    adoption_request::AdoptionStatus,
    dog::{DogStatus, Sex},
    AdoptionRequest, Dog,
};

use common::{body_text, location, seed_dog, seed_shelter, session_cookie, spawn_app, TestApp};

const APPLICATION: &str = "first_name=Anna&last_name=Rossi&email=anna%40example.com\
    &phone=333+1234567&address=Via+Roma+1&housing_type=house_with_garden\
    &experience=moderate&has_children=on";

fn consenting(form: &str) -> String {
    format!("{form}&terms_accepted=on")
}

async fn available_dog(app: &TestApp) -> i32 {
    let shelter = seed_shelter(&app.db).await;
    seed_dog(&app.db, shelter.id, "Luna", Sex::Female, None).await.id
}

#[tokio::test]
async fn submitting_without_consent_stores_nothing() {
    let app = spawn_app().await;
    let dog_id = available_dog(&app).await;

    let response = app
        .post_form(&format!("/dogs/{dog_id}/adopt"), APPLICATION, None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/dogs/{dog_id}/adopt"));

    assert_eq!(AdoptionRequest::find().count(&app.db).await.unwrap(), 0);
    let dog = Dog::find_by_id(dog_id).one(&app.db).await.unwrap().unwrap();
    assert_eq!(dog.status, DogStatus::Available);
}

#[tokio::test]
async fn submission_reserves_the_dog_and_can_be_tracked() {
    let app = spawn_app().await;
    let dog_id = available_dog(&app).await;

    let response = app
        .post_form(&format!("/dogs/{dog_id}/adopt"), &consenting(APPLICATION), None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/adoptions/"));

    let request = AdoptionRequest::find().one(&app.db).await.unwrap().unwrap();
    assert_eq!(request.status, AdoptionStatus::Requested);
    assert!(request.has_children);
    assert!(!request.has_other_animals);
    let code = request.tracking_code.clone().unwrap();
    assert_eq!(code.len(), 8);

    let dog = Dog::find_by_id(dog_id).one(&app.db).await.unwrap().unwrap();
    assert_eq!(dog.status, DogStatus::InAdoption);

    let confirmation = app.get(location(&response), None).await;
    assert_eq!(confirmation.status(), StatusCode::OK);
    assert!(body_text(confirmation).await.contains(&code));

    // Codes are matched case-insensitively, surrounding blanks ignored.
    let typed = format!("+{}+", code.to_lowercase());
    let tracked = app
        .post_form("/track", &format!("tracking_code={typed}"), None)
        .await;
    assert_eq!(tracked.status(), StatusCode::OK);
    let body = body_text(tracked).await;
    assert!(body.contains("Luna"));
    assert!(body.contains("Anna Rossi"));
}

#[tokio::test]
async fn second_submission_for_the_same_dog_is_refused() {
    let app = spawn_app().await;
    let dog_id = available_dog(&app).await;
    let uri = format!("/dogs/{dog_id}/adopt");

    let first = app.post_form(&uri, &consenting(APPLICATION), None).await;
    assert!(location(&first).starts_with("/adoptions/"));

    let second = app.post_form(&uri, &consenting(APPLICATION), None).await;
    assert_eq!(second.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&second), "/dogs");
    assert_eq!(AdoptionRequest::find().count(&app.db).await.unwrap(), 1);

    let form = app.get(&uri, None).await;
    assert_eq!(location(&form), "/dogs");
}

#[tokio::test]
async fn unknown_tracking_code_reports_an_error() {
    let app = spawn_app().await;
    let response = app.post_form("/track", "tracking_code=NOPE1234", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("No request found with this code"));
}

#[tokio::test]
async fn demo_adoption_is_tracked_from_the_session() {
    let app = spawn_app().await;

    let response = app
        .post_form("/demo/dogs/1/adopt", &consenting(APPLICATION), None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dogs/photos");
    let cookie = session_cookie(&response).expect("session cookie");
    assert_eq!(AdoptionRequest::find().count(&app.db).await.unwrap(), 0);

    let gallery = body_text(app.get("/dogs/photos", Some(&cookie)).await).await;
    let marker = "Your tracking code is ";
    let start = gallery.find(marker).expect("flash with the code") + marker.len();
    let code = &gallery[start..start + 8];

    let tracked = app
        .post_form(
            "/track",
            &format!("tracking_code={}", code.to_lowercase()),
            Some(&cookie),
        )
        .await;
    let body = body_text(tracked).await;
    assert!(body.contains("Max"));
    assert!(body.contains("Labrador"));

    // Another visitor does not see it.
    let stranger = app
        .post_form("/track", &format!("tracking_code={code}"), None)
        .await;
    assert!(body_text(stranger)
        .await
        .contains("No request found with this code"));
}
