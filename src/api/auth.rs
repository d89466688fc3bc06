use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Extension, Form},
    response::{Html, IntoResponse, Redirect, Response},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::json;

use super::session::{CurrentOperator, Level, Session};
use crate::entities::{operator, Operator};
use crate::error::AppResult;
use crate::views::Templates;

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// False for a wrong password and for an unreadable stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::error!("Invalid password hash in DB");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[derive(serde::Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

pub async fn login_page(
    Extension(templates): Extension<Templates>,
    mut session: Session,
) -> AppResult<Response> {
    if session.is_staff() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let page: Html<String> = templates.page("login", &mut session, json!({}))?;
    Ok(page.into_response())
}

pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    mut session: Session,
    Form(payload): Form<LoginRequest>,
) -> AppResult<Redirect> {
    let operator = Operator::find()
        .filter(operator::Column::Username.eq(payload.username.trim()))
        .one(&db)
        .await?;

    match operator {
        Some(op) if verify_password(&payload.password, &op.password_hash) => {
            tracing::Span::current()
                .record("table", "operators")
                .record("action", "login_operator")
                .record("operator_id", op.id)
                .record("business_event", "Operator logged in successfully");

            session.flash(Level::Success, format!("Welcome, {}!", op.username));
            session.login(CurrentOperator {
                id: op.id,
                username: op.username,
            });
            Ok(Redirect::to("/dashboard"))
        }
        _ => {
            tracing::Span::current()
                .record("table", "operators")
                .record("action", "login_operator_failed")
                .record("error", "invalid_credentials");

            session.flash(Level::Error, "Invalid username or password.");
            Ok(Redirect::to("/login"))
        }
    }
}

pub async fn logout(mut session: Session) -> Redirect {
    if let Some(op) = session.operator() {
        tracing::Span::current()
            .record("action", "logout_operator")
            .record("operator_id", op.id);
    }
    session.logout();
    session.flash(Level::Info, "You have been logged out.");
    Redirect::to("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_only_their_password() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("S3cret", &hash));
        assert!(!verify_password("s3cret", "not a hash"));
    }
}
