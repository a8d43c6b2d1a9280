//! Spendlog is a web app for recording day-to-day expenses and keeping an eye
//! on where the money goes each month.
//!
//! This library provides a small HTTP server that directly serves HTML pages:
//! users register and log in, record expenses, browse their paginated expense
//! history, and view a monthly dashboard with totals, per-category breakdowns
//! and overspending alerts.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod config;
mod csv_import;
mod dashboard;
mod db;
mod endpoints;
mod expense;
mod html;
mod log_in;
mod log_out;
mod logging;
mod models;
mod pagination;
mod register_user;
mod routing;
mod stores;
mod summary;

pub use app_state::AppState;
pub use config::{AppConfig, CategoryBudgets, parse_budget_spec};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use stores::sqlite::{SQLiteExpenseStore, SQLiteUserStore};

use crate::html::render_error_page;

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down gracefully.
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
    /// An expense was given a zero or negative amount.
    ///
    /// Expenses record money spent, so the amount must be strictly positive.
    #[error("the amount must be greater than zero, got {0} cents")]
    NonPositiveAmount(i64),

    /// An empty string was used for an expense description.
    #[error("the description cannot be empty")]
    EmptyDescription,

    /// An empty string was used for an expense category.
    #[error("the category cannot be empty")]
    EmptyCategory,

    /// A date in the future was used to create or update an expense.
    ///
    /// Expenses record purchases that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// The username used to register was empty or shorter than the minimum.
    #[error("the username must be at least {0} characters long")]
    UsernameTooShort(usize),

    /// The password used to register was shorter than the minimum.
    #[error("the password must be at least {0} characters long")]
    PasswordTooShort(usize),

    /// The password used to register did not contain a digit.
    #[error("the password must contain at least one digit")]
    PasswordMissingDigit,

    /// The username used to register is already taken.
    #[error("the username is already taken")]
    DuplicateUsername,

    /// The year/month filter on the expense history was malformed.
    ///
    /// A month filter without a year is rejected rather than silently
    /// ignored, since the result would otherwise look like an unfiltered
    /// listing.
    #[error("invalid period filter: {0}")]
    InvalidPeriodFilter(String),

    /// A CSV file could not be parsed as expense rows.
    ///
    /// The error string describes the offending row and is safe to show to
    /// the user.
    #[error("could not parse the CSV file: {0}")]
    InvalidCsv(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update an expense that does not exist.
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// The authenticated user does not own the resource they tried to change.
    #[error("the current user does not own this resource")]
    Forbidden,

    /// The username and password combination did not match a registered user.
    ///
    /// Deliberately covers both an unknown username and a wrong password so
    /// that log-in responses do not reveal which usernames exist.
    #[error("the username or password is incorrect")]
    InvalidCredentials,

    /// The session cookies are missing from the request.
    #[error("no session cookies in the cookie jar")]
    CookieMissing,

    /// The session expiry cookie held a date-time that could not be parsed.
    #[error("could not parse session expiry \"{0}\"")]
    InvalidExpiryDate(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("username") =>
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

impl Error {
    /// Whether this error is the caller's fault and can be fixed by
    /// resubmitting with different input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::NonPositiveAmount(_)
                | Error::EmptyDescription
                | Error::EmptyCategory
                | Error::FutureDate(_)
                | Error::UsernameTooShort(_)
                | Error::PasswordTooShort(_)
                | Error::PasswordMissingDigit
                | Error::DuplicateUsername
                | Error::InvalidPeriodFilter(_)
                | Error::InvalidCsv(_)
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound | Error::UpdateMissingExpense => render_error_page(
                StatusCode::NOT_FOUND,
                "Not Found",
                "The page or record you were looking for does not exist.",
            ),
            Error::Forbidden => render_error_page(
                StatusCode::FORBIDDEN,
                "Forbidden",
                "You do not have permission to view or change this record.",
            ),
            Error::InvalidCredentials | Error::CookieMissing => {
                Redirect::to(endpoints::LOG_IN_VIEW).into_response()
            }
            error if error.is_validation_error() => render_error_page(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid Input",
                &error.to_string(),
            ),
            // Remaining errors are internal and must not leak driver details
            // to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something Went Wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
            }
        }
    }
}
