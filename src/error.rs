use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// Error type for page handlers. Internal causes are logged, never rendered.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Database(_) | AppError::Template(_) | AppError::Internal(_) => {
                tracing::Span::current().record("error", tracing::field::display(&self));
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong, please try again later.".to_string(),
                )
            }
        };

        let body = format!(
            "<!DOCTYPE html><html><head><title>{code}</title></head>\
             <body><h1>{code}</h1><p>{message}</p><p><a href=\"/\">Home</a></p></body></html>",
            code = status.as_u16(),
            message = handlebars::html_escape(&message),
        );

        (status, Html(body)).into_response()
    }
}
