use actix_web::http::StatusCode;
use actix_web::ResponseError;

use crate::jsonwebtoken::errors::Error as JsonWebTokenError;
use crate::thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    State(String),

    #[error("access denied: {0}")]
    Unauthorized(String),

    #[error("remote service error: {0}")]
    Remote(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("token error: {0}")]
    Token(#[from] JsonWebTokenError),

    #[error("environment error: {0}")]
    DotEnv(#[from] dotenv::Error),
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => Error::NotFound("record does not exist".into()),
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => Error::Conflict(db.message().to_owned()),
            _ => Error::Database(e),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::State(_) => StatusCode::CONFLICT,
            Error::Unauthorized(_) => StatusCode::FORBIDDEN,
            Error::Remote(_) => StatusCode::BAD_GATEWAY,
            Error::Token(_) => StatusCode::UNAUTHORIZED,
            Error::Database(_) | Error::DotEnv(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
