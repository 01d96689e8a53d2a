use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::result::DatabaseErrorKind;
use thiserror::Error;

use project_tracker_http_errors::ErrorResponseData;

use crate::policy::Action;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database Error: {0}")]
    DbErr(#[from] diesel::result::Error),

    #[error("Database Pool Error: {0}")]
    DbPool(#[from] deadpool_diesel::PoolError),

    #[error("Server error: {0}")]
    ServerError(#[from] hyper::Error),

    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{0} requires administrator access")]
    ReadOnly(Action),

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("API Key Not Found")]
    ApiKeyNotFound,

    #[error("Not found")]
    NotFound,

    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    AxumError(#[from] axum::Error),

    #[error(transparent)]
    Generic(#[from] anyhow::Error),
}

impl Error {
    fn error_kind(&self) -> &'static str {
        match self {
            Error::DbErr(diesel::result::Error::NotFound) => "not_found",
            Error::DbErr(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            )) => "conflict",
            Error::DbErr(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                _,
            )) => "validation",
            Error::DbErr(_) => "db",
            Error::DbPool(_) => "db_pool",
            Error::ServerError(_) => "internal_server_error",
            Error::Validation { .. } => "validation",
            Error::ReadOnly(_) => "read_only",
            Error::Unauthenticated => "authn",
            Error::ApiKeyNotFound => "authn",
            Error::NotFound => "not_found",
            Error::IoError(_) => "internal_server_error",
            Error::AxumError(_) => "bad_request",
            Error::Generic(_) => "internal_server_error",
        }
    }

    pub fn response_tuple(&self) -> (StatusCode, ErrorResponseData) {
        let status = match self {
            Error::DbErr(diesel::result::Error::NotFound) => StatusCode::NOT_FOUND,
            Error::DbErr(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            )) => StatusCode::CONFLICT,
            Error::DbErr(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                _,
            )) => StatusCode::BAD_REQUEST,
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::ReadOnly(_) => StatusCode::FORBIDDEN,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::ApiKeyNotFound => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::AxumError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let data = match self {
            Error::Validation { field, message } => {
                ErrorResponseData::with_field(self.error_kind(), *field, message.clone())
            }
            _ => ErrorResponseData::new(self.error_kind(), self.to_string()),
        };

        (status, data)
    }
}

impl From<deadpool_diesel::InteractError> for Error {
    fn from(e: deadpool_diesel::InteractError) -> Self {
        std::panic::panic_any(e)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (code, json) = self.response_tuple();
        (code, Json(json)).into_response()
    }
}
