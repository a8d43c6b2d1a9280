//! This file defines a user of the application and its supporting types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, models::PasswordHash};

/// The minimum number of characters a username must have.
pub const MIN_USERNAME_LENGTH: usize = 4;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to
/// better compile time errors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The underlying integer ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A username that has passed the registration rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Create and validate a username.
    ///
    /// # Errors
    /// Returns [Error::UsernameTooShort] if `name` is empty or has fewer than
    /// [MIN_USERNAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.chars().count() < MIN_USERNAME_LENGTH {
            return Err(Error::UsernameTooShort(MIN_USERNAME_LENGTH));
        }

        Ok(Self(name.to_string()))
    }

    /// Create a username without validation.
    ///
    /// The caller should ensure the string meets the registration rules.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because
    /// if the length invariant is violated it will cause incorrect behaviour
    /// but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user of the application.
///
/// Each expense is owned by exactly one user; the user's ID is assigned by
/// the store when the user is first persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: UserID,
    username: Username,
    password_hash: PasswordHash,
    created_at: OffsetDateTime,
}

impl User {
    /// Create a user.
    ///
    /// This is intended for use by user stores; to register a new user, go
    /// through [crate::stores::UserStore::create].
    pub fn new(
        id: UserID,
        username: Username,
        password_hash: PasswordHash,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            username,
            password_hash,
            created_at,
        }
    }

    /// The user's ID in the database.
    pub fn id(&self) -> UserID {
        self.id
    }

    /// The unique username the user registered with.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// The user's password hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// When the user registered.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}
