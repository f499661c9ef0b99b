use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed gene identifier: {0}")]
    MalformedIdentifier(String),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("range too large: {begin}-{end} spans more than {max} bases")]
    RangeTooLarge { begin: u64, end: u64, max: u64 },

    #[error("sequence not found: {0}")]
    SequenceNotFound(String),

    #[error("unknown species: {0}")]
    UnknownSpecies(String),

    #[error("unknown experiment: {0}")]
    UnknownExperiment(i64),

    #[error("ambiguous annotation: multiple rows for gene {0}")]
    AmbiguousAnnotation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl Error {
    fn error_type(&self) -> &'static str {
        match self {
            Error::MalformedIdentifier(_) => "MalformedIdentifier",
            Error::InvalidRange(_) => "InvalidRange",
            Error::RangeTooLarge { .. } => "RangeTooLarge",
            Error::SequenceNotFound(_) => "SequenceNotFound",
            Error::UnknownSpecies(_) => "UnknownSpecies",
            Error::UnknownExperiment(_) => "UnknownExperiment",
            Error::AmbiguousAnnotation(_) => "AmbiguousAnnotation",
            Error::Storage(_) => "StorageError",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::MalformedIdentifier(_) => StatusCode::BAD_REQUEST,
            Error::InvalidRange(_) => StatusCode::BAD_REQUEST,
            Error::RangeTooLarge { .. } => StatusCode::FORBIDDEN,
            Error::SequenceNotFound(_) => StatusCode::NOT_FOUND,
            Error::UnknownSpecies(_) => StatusCode::NOT_FOUND,
            Error::UnknownExperiment(_) => StatusCode::NOT_FOUND,
            Error::AmbiguousAnnotation(_) | Error::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error_type(),
            message: self.to_string(),
        };
        (self.status_code(), axum::Json(body)).into_response()
    }
}
