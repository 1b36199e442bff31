use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("{0} not found")]
    NotFound(&'static str),
}

/// Model of the dedicated 404/500 pages.
#[derive(Debug, Serialize)]
pub struct ErrorPage {
    pub status: u16,
    pub error: &'static str,
    pub message: String,
}

pub fn error_page(status: StatusCode, message: impl Into<String>) -> Response {
    let page = ErrorPage {
        status: status.as_u16(),
        error: status.canonical_reason().unwrap_or("Error"),
        message: message.into(),
    };
    (status, Json(page)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(what) => {
                error_page(StatusCode::NOT_FOUND, format!("{what} not found"))
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "request failed");
                error_page(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            }
        }
    }
}
