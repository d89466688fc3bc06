//! Creates or resets a staff account.
//!
//! Usage: `create-operator <username>` with the password read from
//! `OPERATOR_PASSWORD`.

use sea_orm::{ActiveModelTrait, ColumnTrait, Database, EntityTrait, IntoActiveModel, QueryFilter, Set};
use sea_orm_migration::MigratorTrait;
use shelter_server::{api::auth::hash_password, config::Config, entities::operator, migrator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let username = std::env::args()
        .nth(1)
        .filter(|u| !u.trim().is_empty())
        .ok_or("usage: create-operator <username>")?;
    let password = std::env::var("OPERATOR_PASSWORD")
        .map_err(|_| "OPERATOR_PASSWORD must be set")?;
    if password.len() < 8 {
        return Err("OPERATOR_PASSWORD must be at least 8 characters".into());
    }

    let config = Config::from_env()?;
    let db = Database::connect(&config.database_url).await?;
    migrator::Migrator::up(&db, None).await?;

    let password_hash = hash_password(&password).map_err(|e| e.to_string())?;
    let existing = operator::Entity::find()
        .filter(operator::Column::Username.eq(username.trim()))
        .one(&db)
        .await?;

    match existing {
        Some(op) => {
            let mut active = op.into_active_model();
            active.password_hash = Set(password_hash);
            let op = active.update(&db).await?;
            tracing::info!(operator_id = op.id, "Password reset for {}", op.username);
        }
        None => {
            let op = operator::ActiveModel {
                username: Set(username.trim().to_string()),
                password_hash: Set(password_hash),
                created_at: Set(chrono::Utc::now().naive_utc()),
                ..Default::default()
            }
            .insert(&db)
            .await?;
            tracing::info!(operator_id = op.id, "Created operator {}", op.username);
        }
    }
    Ok(())
}
