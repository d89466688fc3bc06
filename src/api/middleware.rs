use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::session::{Level, Session};

/// Lets staff through with their [`CurrentOperator`](super::session::CurrentOperator)
/// in the request extensions; everyone else is sent to the login page.
pub async fn auth_middleware(mut session: Session, mut request: Request, next: Next) -> Response {
    if let Some(operator) = session.operator().cloned() {
        tracing::Span::current().record("operator_id", operator.id);
        request.extensions_mut().insert(operator);
        return next.run(request).await;
    }

    session.flash(Level::Warning, "Please log in to access the staff area.");
    Redirect::to("/login").into_response()
}
