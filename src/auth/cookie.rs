//! Defines functions for handling the session context with private cookies.
//!
//! The session records the authenticated user's ID and username. It is
//! written at log-in, read by the auth middleware on every protected request
//! and cleared at log-out.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{
    Duration, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{Error, models::UserID};

pub(crate) const COOKIE_USER_ID: &str = "user_id";
pub(crate) const COOKIE_USERNAME: &str = "username";
pub(crate) const COOKIE_EXPIRY: &str = "expiry";

/// The default duration for which the session cookies are valid.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::minutes(30);

/// Date time format for the session expiry cookie,
/// e.g. "2021-01-01 00:00:00.000000 +00:00:00".
const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
         sign:mandatory]:[offset_minute]:[offset_second]"
);

/// The identity recorded in the session context.
///
/// The auth middleware inserts this into the request extensions, so route
/// handlers can receive it with `Extension(auth_context)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    /// The ID of the logged-in user.
    pub user_id: UserID,
    /// The username of the logged-in user.
    pub username: String,
}

fn session_cookie(name: &'static str, value: String, expiry: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((name, value))
        .expires(expiry)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Add the session cookies to the cookie jar, indicating that a user is
/// logged in and authenticated.
///
/// Sets the expiry of the session to `duration` from the current time. You
/// can use [DEFAULT_SESSION_DURATION] for the default duration.
///
/// Returns the cookie jar with the cookies added.
///
/// # Errors
/// Returns a [time::error::Format] if the expiry time cannot be formatted.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    username: &str,
    duration: Duration,
) -> Result<PrivateCookieJar, time::error::Format> {
    let expiry = OffsetDateTime::now_utc() + duration;
    // Use format instead of to_string to avoid errors at midnight when the
    // hour is printed as a single digit when DATE_TIME_FORMAT expects two
    // digits.
    let expiry_string = expiry.format(DATE_TIME_FORMAT)?;

    Ok(jar
        .add(session_cookie(
            COOKIE_USER_ID,
            user_id.as_i64().to_string(),
            expiry,
        ))
        .add(session_cookie(COOKIE_USERNAME, username.to_string(), expiry))
        .add(session_cookie(COOKIE_EXPIRY, expiry_string, expiry)))
}

/// Set the session cookies to invalid values and set their max age to zero,
/// which should delete the cookies on the client side.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut jar = jar;

    for name in [COOKIE_USER_ID, COOKIE_USERNAME, COOKIE_EXPIRY] {
        jar = jar.add(
            Cookie::build((name, "deleted"))
                .expires(OffsetDateTime::UNIX_EPOCH)
                .max_age(Duration::ZERO)
                .http_only(true)
                .same_site(SameSite::Strict)
                .secure(true),
        );
    }

    jar
}

/// Read the session context from the cookie jar.
///
/// # Errors
/// Returns a:
/// - [Error::CookieMissing] if any of the session cookies are absent,
/// - [Error::InvalidExpiryDate] if the expiry cookie cannot be parsed,
/// - [Error::InvalidCredentials] if the session has expired or the user ID
///   cookie does not hold an integer.
pub fn get_auth_context(jar: &PrivateCookieJar) -> Result<AuthContext, Error> {
    let user_id_cookie = jar.get(COOKIE_USER_ID).ok_or(Error::CookieMissing)?;
    let username_cookie = jar.get(COOKIE_USERNAME).ok_or(Error::CookieMissing)?;
    let expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::CookieMissing)?;

    let expiry = OffsetDateTime::parse(expiry_cookie.value_trimmed(), DATE_TIME_FORMAT)
        .map_err(|_| Error::InvalidExpiryDate(expiry_cookie.value_trimmed().to_string()))?;

    if expiry <= OffsetDateTime::now_utc() {
        return Err(Error::InvalidCredentials);
    }

    let user_id = user_id_cookie
        .value_trimmed()
        .parse()
        .map(UserID::new)
        .map_err(|_| Error::InvalidCredentials)?;

    Ok(AuthContext {
        user_id,
        username: username_cookie.value_trimmed().to_string(),
    })
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::PrivateCookieJar;
    use time::Duration;

    use crate::{Error, app_state::create_cookie_key, models::UserID};

    use super::{AuthContext, get_auth_context, invalidate_auth_cookie, set_auth_cookie};

    fn get_jar() -> PrivateCookieJar {
        PrivateCookieJar::new(create_cookie_key("notverysecret"))
    }

    #[test]
    fn set_then_get_roundtrips_the_context() {
        let jar = get_jar();

        let jar =
            set_auth_cookie(jar, UserID::new(7), "bobby", Duration::minutes(30)).unwrap();

        let got = get_auth_context(&jar).unwrap();

        assert_eq!(
            got,
            AuthContext {
                user_id: UserID::new(7),
                username: "bobby".to_string(),
            }
        );
    }

    #[test]
    fn get_fails_on_empty_jar() {
        let jar = get_jar();

        assert_eq!(get_auth_context(&jar), Err(Error::CookieMissing));
    }

    #[test]
    fn get_fails_on_expired_session() {
        let jar = get_jar();

        let jar = set_auth_cookie(jar, UserID::new(7), "bobby", Duration::minutes(-5)).unwrap();

        assert_eq!(get_auth_context(&jar), Err(Error::InvalidCredentials));
    }

    #[test]
    fn invalidate_clears_the_context() {
        let jar = get_jar();

        let jar = set_auth_cookie(jar, UserID::new(7), "bobby", Duration::minutes(30)).unwrap();
        let jar = invalidate_auth_cookie(jar);

        assert!(get_auth_context(&jar).is_err());
    }
}
