//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of username and password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The bearer token in the request was missing, malformed, or expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A token could not be created for a logged-in user.
    #[error("could not create auth token: {0}")]
    TokenCreationError(String),

    /// An empty string was used as a username.
    #[error("username cannot be empty")]
    EmptyUsername,

    /// The username already exists in the database.
    ///
    /// Registration must be retried with a different username.
    #[error("the username already exists in the database")]
    DuplicateUsername,

    /// A transaction or budget amount was negative or not a finite number.
    ///
    /// Amounts store a magnitude only; the sign of a transaction is derived
    /// from its type, so a negative or non-finite amount is always a caller
    /// error and must never reach the aggregates.
    #[error("'{0}' is not a valid amount; amounts must be finite and non-negative")]
    InvalidAmount(String),

    /// The multipart form could not be parsed as a list of CSV files.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// The multipart form did not contain a CSV file.
    #[error("file is not a CSV")]
    NotCSV,

    /// The CSV had issues that prevented it from being parsed.
    #[error("could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status_code, message) = match self {
            Error::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid username or password")
            }
            Error::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            Error::DuplicateUsername => (StatusCode::BAD_REQUEST, "Username already exists"),
            Error::EmptyUsername => (StatusCode::BAD_REQUEST, "Username cannot be empty"),
            Error::TooWeak(ref details) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorBody {
                        error: format!("Password is too weak: {details}"),
                    }),
                )
                    .into_response();
            }
            Error::InvalidAmount(_) | Error::InvalidCSV(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorBody {
                        error: self.to_string(),
                    }),
                )
                    .into_response();
            }
            Error::NotCSV => (StatusCode::BAD_REQUEST, "File type must be CSV"),
            Error::MultipartError(_) => (StatusCode::BAD_REQUEST, "Could not read uploaded file"),
            Error::NotFound => (StatusCode::NOT_FOUND, "Not found"),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred, check the server logs for more details",
                )
            }
        };

        (
            status_code,
            Json(ErrorBody {
                error: message.to_owned(),
            }),
        )
            .into_response()
    }
}
