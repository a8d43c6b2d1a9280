/*! Defines and implements traits for interacting with the application's database. */

use rusqlite::{Connection, Error, Row};

use crate::stores::sqlite::{SQLiteExpenseStore, SQLiteUserStore};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a
/// concrete rust type.
pub trait MapRow {
    /// The type that a row is mapped to.
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// The default implementation reads from the start of the row.
    fn map_row(row: &Row) -> Result<Self::ReturnType, Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, starting from the column at
    /// `offset`. This is useful for mapping the result of a JOIN query where
    /// the row holds the columns of more than one model.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, Error>;
}

/// Create the tables for the domain models in the database attached to
/// `connection`.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    SQLiteUserStore::create_table(connection)?;
    SQLiteExpenseStore::create_table(connection)?;

    Ok(())
}
