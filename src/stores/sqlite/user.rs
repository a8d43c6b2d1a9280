//! Implements a SQLite backed user store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{PasswordHash, User, UserID, Username},
    stores::UserStore,
};

/// Handles the creation and retrieval of User objects.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new user store.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl UserStore for SQLiteUserStore {
    /// Create and insert a new user into the database.
    ///
    /// # Panics
    /// Panics if the database lock is already acquired by the same thread or
    /// is poisoned.
    ///
    /// # Errors
    /// Returns [Error::DuplicateUsername] if the username is already taken,
    /// or [Error::SqlError] if an SQL related error occurred.
    fn create(&mut self, username: Username, password_hash: PasswordHash) -> Result<User, Error> {
        let connection = self.connection.lock().unwrap();
        let created_at = OffsetDateTime::now_utc();

        connection.execute(
            "INSERT INTO user (username, password, created_at) VALUES (?1, ?2, ?3)",
            (username.as_ref(), password_hash.to_string(), created_at),
        )?;

        let id = UserID::new(connection.last_insert_rowid());

        Ok(User::new(id, username, password_hash, created_at))
    }

    /// Get the user from the database that has the specified `id`.
    ///
    /// # Panics
    /// Panics if the database lock is already acquired by the same thread or
    /// is poisoned.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no user with the specified ID, or
    /// [Error::SqlError] if there are SQL related errors.
    fn get(&self, id: UserID) -> Result<User, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare("SELECT id, username, password, created_at FROM user WHERE id = :id")?
            .query_row(&[(":id", &id.as_i64())], SQLiteUserStore::map_row)
            .map_err(|e| e.into())
    }

    /// Get the user from the database that has the specified `username`.
    ///
    /// # Panics
    /// Panics if the database lock is already acquired by the same thread or
    /// is poisoned.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no user with the specified
    /// username, or [Error::SqlError] if there are SQL related errors.
    fn get_by_username(&self, username: &str) -> Result<User, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, username, password, created_at FROM user WHERE username = :username",
            )?
            .query_row(&[(":username", &username)], SQLiteUserStore::map_row)
            .map_err(|e| e.into())
    }
}

impl CreateTable for SQLiteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                    id INTEGER PRIMARY KEY,
                    username TEXT UNIQUE NOT NULL,
                    password TEXT NOT NULL,
                    created_at TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteUserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let raw_id = row.get(offset)?;
        let raw_username: String = row.get(offset + 1)?;
        let raw_password_hash: String = row.get(offset + 2)?;
        let created_at = row.get(offset + 3)?;

        let id = UserID::new(raw_id);
        let username = Username::new_unchecked(&raw_username);
        let password_hash = PasswordHash::new_unchecked(&raw_password_hash);

        Ok(Self::ReturnType::new(id, username, password_hash, created_at))
    }
}
