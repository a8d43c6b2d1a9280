//! Implements a struct that holds the state of the server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    AppConfig, Error,
    auth::DEFAULT_SESSION_DURATION,
    db::initialize,
    pagination::PaginationConfig,
    stores::sqlite::{SQLiteExpenseStore, SQLiteUserStore},
};

/// The state of the server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which the session cookies are valid.
    pub cookie_duration: Duration,

    /// The category set and alert budgets.
    pub config: AppConfig,

    /// The config that controls how the expense list is paged.
    pub pagination_config: PaginationConfig,

    /// The store for user accounts.
    pub user_store: SQLiteUserStore,

    /// The store for expense records.
    pub expense_store: SQLiteExpenseStore,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for
    /// the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        config: AppConfig,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_SESSION_DURATION,
            config,
            pagination_config,
            user_store: SQLiteUserStore::new(connection.clone()),
            expense_store: SQLiteExpenseStore::new(connection),
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret` string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

#[cfg(test)]
mod app_state_tests {
    use rusqlite::Connection;

    use super::AppState;

    #[test]
    fn new_initializes_database() {
        let conn = Connection::open_in_memory().unwrap();

        let state = AppState::new(
            conn,
            "averysecretsecret",
            Default::default(),
            Default::default(),
        );

        assert!(state.is_ok());
    }
}
