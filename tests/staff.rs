mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use shelter_server::entities::{
    activity, adoption_request::AdoptionStatus, dog, dog::DogStatus, dog::Sex, Activity,
    AdoptionRequest, Dog, HealthRecord, Shelter,
};

use common::{
    body_text, location, seed_dog, seed_operator, seed_shelter, spawn_app, TestApp, OPERATOR,
    PASSWORD,
};

const BOUNDARY: &str = "shelter-test-boundary";

fn multipart(field: &str, file_name: &str, content_type: &str, data: &str) -> String {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\r\n\
         {data}\r\n\
         --{BOUNDARY}--\r\n"
    )
}

async fn upload(app: &TestApp, uri: &str, cookie: &str, body: String) -> axum::http::Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.send(request).await
}

#[tokio::test]
async fn wrong_password_goes_back_to_login() {
    let app = spawn_app().await;
    seed_operator(&app.db).await;

    let response = app
        .post_form("/login", "username=giulia&password=wrong", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn operator_reaches_every_staff_page() {
    let app = spawn_app().await;
    seed_operator(&app.db).await;
    let shelter = seed_shelter(&app.db).await;
    let dog = seed_dog(&app.db, shelter.id, "Luna", Sex::Female, None).await;
    let cookie = app.login().await;

    for uri in [
        "/dashboard".to_string(),
        "/manage/dogs".to_string(),
        "/manage/dogs?status=available&sort=name&page=1".to_string(),
        "/manage/dogs/import".to_string(),
        "/manage/adoptions".to_string(),
        "/manage/shelters".to_string(),
        format!("/manage/dogs/{}/health", dog.id),
        format!("/manage/dogs/{}/activities", dog.id),
    ] {
        let response = app.get(&uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    let dashboard = body_text(app.get("/dashboard", Some(&cookie)).await).await;
    assert!(dashboard.contains("giulia"));
}

#[tokio::test]
async fn csv_import_reports_each_row() {
    let app = spawn_app().await;
    seed_operator(&app.db).await;
    let shelter = seed_shelter(&app.db).await;
    let cookie = app.login().await;

    let csv = format!(
        "name,breed,birth_date,sex,weight,microchip,sterilized,shelter_id\n\
         Rex,German Shepherd,2020-05-15,M,30.5,123456789012345,yes,{id}\n\
         Luna,Beagle,,F,,,no,{id}\n\
         Copy,Beagle,,F,,123456789012345,no,{id}\n\
         Short,Beagle\n",
        id = shelter.id
    );
    let response = upload(
        &app,
        "/manage/dogs/import",
        &cookie,
        multipart("csv_file", "dogs.csv", "text/csv", &csv),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("2 imported, 2 skipped"));

    let rex = Dog::find()
        .filter(dog::Column::Name.eq("Rex"))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rex.microchip.as_deref(), Some("123456789012345"));
    assert!(rex.sterilized);
    assert_eq!(rex.weight, Some(30.5));
    assert_eq!(rex.status, DogStatus::Available);
    assert_eq!(Dog::find().count(&app.db).await.unwrap(), 2);
}

#[tokio::test]
async fn csv_import_rejects_other_file_types() {
    let app = spawn_app().await;
    seed_operator(&app.db).await;
    let cookie = app.login().await;

    let response = upload(
        &app,
        "/manage/dogs/import",
        &cookie,
        multipart("csv_file", "dogs.xlsx", "application/octet-stream", "not,a,csv"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(Dog::find().count(&app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn completing_an_adoption_marks_the_dog_adopted() {
    let app = spawn_app().await;
    seed_operator(&app.db).await;
    let shelter = seed_shelter(&app.db).await;
    let dog = seed_dog(&app.db, shelter.id, "Luna", Sex::Female, None).await;
    let cookie = app.login().await;

    app.post_form(
        &format!("/dogs/{}/adopt", dog.id),
        "first_name=Anna&last_name=Rossi&email=a%40b.it&phone=1&address=x\
         &housing_type=apartment&experience=none&terms_accepted=on",
        None,
    )
    .await;
    let request = AdoptionRequest::find().one(&app.db).await.unwrap().unwrap();
    let uri = format!("/manage/adoptions/{}/status", request.id);

    // Skipping review is not allowed.
    let response = app
        .post_form(&uri, "status=completed&completion_date=&notes=", Some(&cookie))
        .await;
    assert_eq!(location(&response), "/manage/adoptions");
    let unchanged = AdoptionRequest::find_by_id(request.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, AdoptionStatus::Requested);

    for status in ["under_review", "approved"] {
        app.post_form(&uri, &format!("status={status}&notes="), Some(&cookie))
            .await;
    }
    app.post_form(
        &uri,
        "status=completed&completion_date=2025-03-01&notes=Signed+the+papers",
        Some(&cookie),
    )
    .await;

    let done = AdoptionRequest::find_by_id(request.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.status, AdoptionStatus::Completed);
    assert_eq!(done.completion_date.unwrap().to_string(), "2025-03-01");
    assert!(done.notes.contains("Signed the papers"));
    assert!(done.operator_id.is_some());

    let dog = Dog::find_by_id(dog.id).one(&app.db).await.unwrap().unwrap();
    assert_eq!(dog.status, DogStatus::Adopted);
}

#[tokio::test]
async fn staff_records_shelters_health_and_activities() {
    let app = spawn_app().await;
    let operator = seed_operator(&app.db).await;
    let cookie = app.login().await;

    app.post_form(
        "/manage/shelters",
        "name=Rifugio+Nord&address=Via+1&city=Lecco&phone=1&email=n%40r.it&max_capacity=12",
        Some(&cookie),
    )
    .await;
    let shelter = Shelter::find().one(&app.db).await.unwrap().unwrap();
    assert_eq!(shelter.max_capacity, 12);

    let dog = seed_dog(&app.db, shelter.id, "Birba", Sex::Female, None).await;

    let response = app
        .post_form(
            &format!("/manage/dogs/{}/health", dog.id),
            "date=2025-02-01&intervention_type=Vaccination&veterinarian=Dr+Bianchi\
             &next_checkup=2025-08-01",
            Some(&cookie),
        )
        .await;
    assert_eq!(location(&response), format!("/manage/dogs/{}/health", dog.id));
    assert_eq!(HealthRecord::find().count(&app.db).await.unwrap(), 1);

    app.post_form(
        &format!("/manage/dogs/{}/activities", dog.id),
        "kind=walk&date=2025-02-01&start_time=09:30&end_time=10:15&note=Park",
        Some(&cookie),
    )
    .await;
    // An end before the start is refused.
    app.post_form(
        &format!("/manage/dogs/{}/activities", dog.id),
        "kind=walk&date=2025-02-01&start_time=11:00&end_time=10:00",
        Some(&cookie),
    )
    .await;
    let logged = Activity::find()
        .filter(activity::Column::DogId.eq(dog.id))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].operator_id, operator.id);
}

#[tokio::test]
async fn deleting_a_dog_removes_it() {
    let app = spawn_app().await;
    seed_operator(&app.db).await;
    let shelter = seed_shelter(&app.db).await;
    let dog = seed_dog(&app.db, shelter.id, "Birba", Sex::Female, None).await;
    let cookie = app.login().await;

    let response = app
        .post_form(&format!("/manage/dogs/{}/delete", dog.id), "", Some(&cookie))
        .await;
    assert_eq!(location(&response), "/manage/dogs");
    assert!(Dog::find_by_id(dog.id).one(&app.db).await.unwrap().is_none());
}

#[tokio::test]
async fn rejected_dog_is_released_by_staff_and_adoptable_again() {
    let app = spawn_app().await;
    seed_operator(&app.db).await;
    let shelter = seed_shelter(&app.db).await;
    let dog = seed_dog(&app.db, shelter.id, "Luna", Sex::Female, None).await;
    let cookie = app.login().await;
    let adopt = format!("/dogs/{}/adopt", dog.id);
    let application = "first_name=Anna&last_name=Rossi&email=a%40b.it&phone=1&address=x\
         &housing_type=apartment&experience=none&terms_accepted=on";
    let release = format!("/manage/dogs/{}/status", dog.id);

    app.post_form(&adopt, application, None).await;
    let request = AdoptionRequest::find().one(&app.db).await.unwrap().unwrap();

    // The open request keeps the dog reserved.
    let response = app
        .post_form(&release, "status=available", Some(&cookie))
        .await;
    assert_eq!(location(&response), "/manage/dogs");
    let reserved = Dog::find_by_id(dog.id).one(&app.db).await.unwrap().unwrap();
    assert_eq!(reserved.status, DogStatus::InAdoption);

    app.post_form(
        &format!("/manage/adoptions/{}/status", request.id),
        "status=rejected&notes=Garden+too+small",
        Some(&cookie),
    )
    .await;
    app.post_form(&release, "status=available", Some(&cookie))
        .await;
    let released = Dog::find_by_id(dog.id).one(&app.db).await.unwrap().unwrap();
    assert_eq!(released.status, DogStatus::Available);

    let again = app.post_form(&adopt, application, None).await;
    assert!(location(&again).starts_with("/adoptions/"));
    assert_eq!(AdoptionRequest::find().count(&app.db).await.unwrap(), 2);
}

#[tokio::test]
async fn staff_status_change_needs_a_known_status() {
    let app = spawn_app().await;
    seed_operator(&app.db).await;
    let shelter = seed_shelter(&app.db).await;
    let dog = seed_dog(&app.db, shelter.id, "Birba", Sex::Female, None).await;
    let cookie = app.login().await;

    let uri = format!("/manage/dogs/{}/status", dog.id);
    app.post_form(&uri, "status=sleeping", Some(&cookie)).await;
    let unchanged = Dog::find_by_id(dog.id).one(&app.db).await.unwrap().unwrap();
    assert_eq!(unchanged.status, DogStatus::Available);

    app.post_form(&uri, "status=not_adoptable", Some(&cookie)).await;
    let changed = Dog::find_by_id(dog.id).one(&app.db).await.unwrap().unwrap();
    assert_eq!(changed.status, DogStatus::NotAdoptable);

    let missing = app
        .post_form("/manage/dogs/999/status", "status=available", Some(&cookie))
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_cookie_is_http_only_and_same_site() {
    let app = spawn_app().await;
    seed_operator(&app.db).await;

    let response = app
        .post_form(
            "/login",
            &format!("username={OPERATOR}&password={}", PASSWORD.replace(' ', "+")),
            None,
        )
        .await;
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("shelter_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
}
