use std::sync::Arc;

use api_types::error::ErrorAlert;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, app, run_with_listener, spawn_with_listener};

mod headers;
mod material_methods;
mod materials;
mod pagination;
mod server;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Request rejected with an alert naming the entity and the error key.
    BadRequest(Alert),
    NotFound,
    Generic(String),
    UnsupportedMediaType(String),
    Internal(String),
}

/// A client-visible rejection, e.g. `idexists` on `materialMethod`.
#[derive(Debug)]
pub struct Alert {
    pub app_name: Arc<str>,
    pub title: String,
    pub entity_name: &'static str,
    pub error_key: &'static str,
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Invalid(_) | EngineError::UnknownRelation(_) => StatusCode::BAD_REQUEST,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::BadRequest(alert) => return alert.into_response(),
            ServerError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::UnsupportedMediaType(err) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, err),
            ServerError::Internal(err) => {
                tracing::error!("internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(Error { error })).into_response()
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        let headers = headers::error_alert(&self.app_name, self.entity_name, self.error_key);
        let body = ErrorAlert {
            title: self.title,
            status: StatusCode::BAD_REQUEST.as_u16(),
            entity_name: self.entity_name.to_string(),
            error_key: self.error_key.to_string(),
            message: format!("error.{}", self.error_key),
        };
        (StatusCode::BAD_REQUEST, headers, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        match value {
            JsonRejection::MissingJsonContentType(err) => {
                Self::UnsupportedMediaType(err.body_text())
            }
            other => Self::Generic(other.body_text()),
        }
    }
}
