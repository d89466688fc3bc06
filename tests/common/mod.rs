#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use chrono::{Months, NaiveDate};
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tower::ServiceExt;

use shelter_server::{
    api,
    config::Config,
    entities::{dog, operator, shelter},
    migrator::Migrator,
    services::today,
    views::Templates,
};

pub const OPERATOR: &str = "giulia";
pub const PASSWORD: &str = "correct horse battery";

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub media_dir: PathBuf,
}

pub async fn spawn_app() -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("in-memory database");
    Migrator::up(&db, None).await.expect("migrations");

    let media_dir = std::env::temp_dir().join(format!("shelter-test-{}", uuid::Uuid::new_v4()));
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".parse().expect("bind addr"),
        session_secret: Some("s".repeat(64)),
        media_dir: media_dir.clone(),
        cors_origin: "http://localhost:3003".to_string(),
        log_format: "text".to_string(),
        otlp_endpoint: None,
    };
    let templates = Templates::new().expect("templates");
    let router = api::router(db.clone(), templates, Arc::new(config));

    TestApp {
        router,
        db,
        media_dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).expect("request"))
            .await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body.to_string())).expect("request"))
            .await
    }

    /// Logs the seeded operator in and returns the session cookie.
    pub async fn login(&self) -> String {
        let body = format!("username={OPERATOR}&password={}", PASSWORD.replace(' ', "+"));
        let response = self.post_form("/login", &body, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
        session_cookie(&response).expect("login sets the session cookie")
    }
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// `name=value` of the session cookie set by a response.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(api::session::SESSION_COOKIE))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub fn years_ago(years: u32) -> NaiveDate {
    today()
        .checked_sub_months(Months::new(years * 12))
        .expect("date in range")
}

pub async fn seed_shelter(db: &DatabaseConnection) -> shelter::Model {
    shelter::ActiveModel {
        name: Set("Canile di Monza".to_string()),
        address: Set("Via dei Cani 1".to_string()),
        city: Set("Monza".to_string()),
        phone: Set("039 000000".to_string()),
        email: Set("info@canile.example".to_string()),
        max_capacity: Set(40),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("shelter")
}

pub async fn seed_operator(db: &DatabaseConnection) -> operator::Model {
    operator::ActiveModel {
        username: Set(OPERATOR.to_string()),
        password_hash: Set(api::auth::hash_password(PASSWORD).expect("hash")),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("operator")
}

pub async fn seed_dog(
    db: &DatabaseConnection,
    shelter_id: i32,
    name: &str,
    sex: dog::Sex,
    birth_date: Option<NaiveDate>,
) -> dog::Model {
    dog::ActiveModel {
        name: Set(name.to_string()),
        breed: Set("Mixed".to_string()),
        birth_date: Set(birth_date),
        intake_date: Set(years_ago(1)),
        sex: Set(sex),
        size: Set(None),
        weight: Set(None),
        microchip: Set(None),
        sterilized: Set(false),
        good_with_children: Set(true),
        good_with_animals: Set(true),
        description: Set(String::new()),
        status: Set(dog::DogStatus::Available),
        shelter_id: Set(shelter_id),
        photo: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("dog")
}
