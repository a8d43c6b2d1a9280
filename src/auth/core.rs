//! The registration and credential verification logic behind the auth routes.

use crate::{
    Error,
    models::{PasswordHash, User, Username, ValidatedPassword},
    stores::UserStore,
};

/// Register a new user.
///
/// The password is hashed with bcrypt using the given `cost`; pass
/// [PasswordHash::DEFAULT_COST] unless a lower cost is needed (e.g. tests).
///
/// # Errors
/// This function will return a:
/// - [Error::UsernameTooShort] if the username is empty or too short,
/// - [Error::PasswordTooShort] or [Error::PasswordMissingDigit] if the
///   password does not meet the registration rules,
/// - [Error::DuplicateUsername] if the username is already taken,
/// - [Error::HashingError] if the password could not be hashed.
pub fn register_user(
    store: &mut impl UserStore,
    username: &str,
    password: &str,
    cost: u32,
) -> Result<User, Error> {
    let username = Username::new(username)?;
    let password = ValidatedPassword::new(password)?;
    let password_hash = PasswordHash::new(password, cost)?;

    let user = store.create(username, password_hash)?;

    tracing::info!("registered user {}", user.username());

    Ok(user)
}

/// Check a log-in attempt against the registered users.
///
/// # Errors
/// Returns [Error::InvalidCredentials] when the username is unknown or the
/// password does not verify. The two cases deliberately produce the same
/// error so responses cannot be used to probe which usernames exist.
pub fn verify_credentials(
    store: &impl UserStore,
    username: &str,
    password: &str,
) -> Result<User, Error> {
    let user = match store.get_by_username(username) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    let is_password_valid = user
        .password_hash()
        .verify(password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    Ok(user)
}
