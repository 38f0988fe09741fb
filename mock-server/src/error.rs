use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("validation failed")]
    Validation(BTreeMap<&'static str, String>),
    #[error("{0}")]
    Conflict(String),
}

impl AppError {
    pub(crate) fn from_fields(fields: BTreeMap<&'static str, String>) -> Result<(), AppError> {
        if fields.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(fields))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            AppError::Validation(fields) => {
                tracing::debug!(?fields, "rejected input");
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": message, "fields": fields }),
                )
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, json!({ "error": message })),
        };
        (status, Json(body)).into_response()
    }
}
