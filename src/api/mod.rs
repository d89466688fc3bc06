pub mod adoptions;
pub mod auth;
pub mod dashboard;
pub mod dogs;
pub mod manage_adoptions;
pub mod manage_dogs;
pub mod middleware;
pub mod pages;
pub mod records;
pub mod session;
pub mod shelters;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    http::{header, HeaderValue, Method, Request, Response},
    routing::{get, post},
    Extension, Router,
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::views::Templates;

const UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Builds every page route with its shared state and request tracing.
/// `/metrics` is mounted by the server binary.
pub fn router(db: DatabaseConnection, templates: Templates, config: Arc<Config>) -> Router {
    let public_routes = Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact))
        .route("/dogs", get(dogs::list))
        .route("/dogs/photos", get(dogs::photos))
        .route("/dogs/:id", get(dogs::detail))
        .route(
            "/dogs/:id/adopt",
            get(adoptions::adopt_form).post(adoptions::submit),
        )
        .route(
            "/adoptions/:id/confirmation",
            get(adoptions::confirmation),
        )
        .route("/track", get(adoptions::track_form).post(adoptions::track))
        .route("/demo/dogs/:id", get(adoptions::demo_detail))
        .route(
            "/demo/dogs/:id/adopt",
            get(adoptions::demo_adopt_form).post(adoptions::demo_submit),
        )
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout));

    let staff_routes = Router::new()
        .route("/dashboard", get(dashboard::dashboard))
        .route(
            "/manage/dogs",
            get(manage_dogs::list).post(manage_dogs::create),
        )
        .route(
            "/manage/dogs/import",
            get(manage_dogs::import_page).post(manage_dogs::import),
        )
        .route("/manage/dogs/:id/delete", post(manage_dogs::delete))
        .route("/manage/dogs/:id/status", post(manage_dogs::change_status))
        .route("/manage/dogs/:id/photo", post(manage_dogs::upload_photo))
        .route(
            "/manage/dogs/:id/health",
            get(records::health_records).post(records::add_health_record),
        )
        .route(
            "/manage/dogs/:id/activities",
            get(records::activities).post(records::add_activity),
        )
        .route("/manage/adoptions", get(manage_adoptions::list))
        .route(
            "/manage/adoptions/:id/status",
            post(manage_adoptions::change_status),
        )
        .route(
            "/manage/shelters",
            get(shelters::list).post(shelters::create),
        )
        .route_layer(axum::middleware::from_fn(middleware::auth_middleware));

    let cors = match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
        Err(_) => {
            tracing::warn!("Ignoring invalid CORS_ORIGIN {:?}", config.cors_origin);
            CorsLayer::new()
        }
    };

    Router::new()
        .route("/health", get(pages::health_check))
        .merge(public_routes)
        .merge(staff_routes)
        .nest_service("/media", ServeDir::new(&config.media_dir))
        .layer(Extension(db))
        .layer(Extension(templates))
        .layer(Extension(config.session_key()))
        .layer(Extension(config))
        .layer(tower_cookies::CookieManagerLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(|matched| matched.as_str());

                    // "METHOD /route/:id", falling back to the raw path.
                    let span_name = match matched_path {
                        Some(path) => format!("{} {}", request.method(), path),
                        None => format!("{} {}", request.method(), request.uri().path()),
                    };

                    let client_ip = request
                        .headers()
                        .get("x-forwarded-for")
                        .and_then(|v| v.to_str().ok())
                        .or_else(|| {
                            request
                                .headers()
                                .get("x-real-ip")
                                .and_then(|v| v.to_str().ok())
                        })
                        .unwrap_or("unknown");

                    // Handlers fill the empty fields in.
                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name,
                        client_ip = client_ip,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        table = tracing::field::Empty,
                        action = tracing::field::Empty,
                        operator_id = tracing::field::Empty,
                        dog_id = tracing::field::Empty,
                        business_event = tracing::field::Empty,
                        error = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_request(|_request: &Request<Body>, _span: &tracing::Span| {})
                .on_response(
                    |response: &Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        span.record("status", tracing::field::display(response.status()));
                        span.record("latency", tracing::field::debug(latency));
                        tracing::info!("request completed");
                    },
                ),
        )
        .layer(cors)
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
}
