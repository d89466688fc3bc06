use std::sync::Arc;

use axum::routing::get;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use shelter_server::{api, config::Config, migrator, views::Templates};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    let config = Arc::new(Config::from_env()?);
    shelter_server::telemetry::init_telemetry("shelter-server", &config)?;

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);
    let db = Database::connect(options).await?;

    migrator::Migrator::up(&db, None).await?;
    shelter_server::metrics::init_metrics(&db).await;

    tokio::fs::create_dir_all(&config.media_dir).await?;
    let templates = Templates::new()?;

    let app = api::router(db, templates, config.clone())
        .layer(prometheus_layer)
        .route("/metrics", get(|| async move { metric_handle.render() }));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
