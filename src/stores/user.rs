//! Defines the user store trait.

use crate::{
    Error,
    models::{PasswordHash, User, UserID, Username},
};

/// Handles the creation and retrieval of User objects.
pub trait UserStore {
    /// Create a new user.
    ///
    /// Implementers should return [Error::DuplicateUsername] if the username
    /// is already taken.
    fn create(&mut self, username: Username, password_hash: PasswordHash) -> Result<User, Error>;

    /// Get a user by their ID.
    ///
    /// Returns [Error::NotFound] if no user with the given ID exists.
    fn get(&self, id: UserID) -> Result<User, Error>;

    /// Get a user by their username.
    ///
    /// Takes a raw string so that log-in attempts with strings that would not
    /// pass registration validation still produce a uniform "not found"
    /// result rather than a validation error.
    ///
    /// Returns [Error::NotFound] if no user with the given username exists.
    fn get_by_username(&self, username: &str) -> Result<User, Error>;
}
