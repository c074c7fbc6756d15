//! Salesboard serves monthly sales reports over a collection of product
//! transactions.
//!
//! This library provides a JSON REST API for seeding the transaction store
//! from a remote document, listing a month's transactions with search and
//! pagination, and three aggregate reports: summary statistics, a price
//! histogram and per-category counts.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod month;
mod not_found;
mod pagination;
mod report;
mod routing;
mod seed;
mod timezone;
mod transaction;

pub use app_state::{AppConfig, AppState};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use seed::{
    DEFAULT_SEED_URL, build_http_client, fetch_seed_transactions, parse_seed_transactions,
    replace_all_transactions,
};
pub use transaction::{NewTransaction, Transaction};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required query parameter was not included in the request.
    #[error("missing query parameter \"{0}\"")]
    MissingParameter(&'static str),

    /// The month could not be parsed as a month number (1-12) or an English
    /// month name.
    #[error("invalid month \"{0}\", expected a number from 1 to 12 or a month name")]
    InvalidMonth(String),

    /// The year could not be parsed or is outside of the supported range.
    #[error("invalid year \"{0}\", expected a year from {min} to {max}", min = month::MIN_YEAR, max = month::MAX_YEAR)]
    InvalidYear(String),

    /// A page number or page size of zero was requested.
    ///
    /// Callers should pass in the name of the offending parameter.
    #[error("\"{0}\" must be a number greater than zero")]
    InvalidPagination(&'static str),

    /// The configured timezone is not a valid, canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The seed document could not be downloaded.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not fetch seed data: {0}")]
    SeedFetchError(String),

    /// The seed document was not a JSON array of transactions.
    #[error("could not parse seed data: {0}")]
    SeedParseError(String),

    /// A seed record had a negative or non-finite price.
    ///
    /// Callers should pass in the title of the offending record and its price.
    #[error("the transaction \"{0}\" has an invalid price {1}")]
    InvalidPrice(String, f64),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
struct ErrorResponse<'a> {
    message: &'a str,
    error: String,
}

impl Error {
    /// The status code for the error.
    ///
    /// Errors caused by the request parameters are client errors, everything
    /// else is reported as an internal server error.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingParameter(_)
            | Error::InvalidMonth(_)
            | Error::InvalidYear(_)
            | Error::InvalidPagination(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert the error into a JSON response with the endpoint specific
    /// `message` and the error details.
    fn into_api_response(self, message: &str) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!("{message}: {self}");
        } else {
            tracing::warn!("{message}: {self}");
        }

        (
            status_code,
            Json(ErrorResponse {
                message,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::http::StatusCode;

    use crate::Error;

    #[test]
    fn validation_errors_are_bad_requests() {
        assert_eq!(
            Error::MissingParameter("month").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InvalidMonth("Smarch".to_owned()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InvalidYear("year".to_owned()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InvalidPagination("page").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn store_and_upstream_errors_are_server_errors() {
        assert_eq!(
            Error::DatabaseLockError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::SeedFetchError("timed out".to_owned()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::SqlError(rusqlite::Error::InvalidQuery).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn api_response_contains_message_and_detail() {
        let response = Error::InvalidMonth("Smarch".to_owned())
            .into_api_response("Error fetching statistics");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(body["message"], "Error fetching statistics");
        assert_eq!(
            body["error"],
            "invalid month \"Smarch\", expected a number from 1 to 12 or a month name"
        );
    }
}
