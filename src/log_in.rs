//! The routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level credential and cookie logic.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{set_auth_cookie, verify_credentials},
    endpoints,
    html::{base, labelled_input},
};

/// The error message shown for a failed log-in attempt.
///
/// The same message is used whether the username or the password was wrong so
/// the page does not reveal which usernames exist.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect username or password.";

fn log_in_page(username: &str, error_message: Option<&str>) -> Markup {
    base(
        "Log in",
        html! {
            main {
                h1 { "Log in" }
                form .stacked action=(endpoints::LOG_IN_API) method="post" {
                    (labelled_input("Username", "username", "text", username, None))
                    (labelled_input("Password", "password", "password", "", error_message))
                    button type="submit" { "Log in" }
                }
                p {
                    "Don't have an account? "
                    a href=(endpoints::REGISTER_VIEW) { "Register here" }
                }
            }
        },
    )
}

/// Display the log-in page.
pub async fn get_log_in_page() -> Response {
    log_in_page("", None).into_response()
}

/// The raw data entered by the user in the log-in form.
///
/// The username and password are plain strings. There is no need for
/// validation here since they are compared against the stored credentials,
/// which were validated at registration.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Username entered during log-in.
    pub username: String,
    /// Password entered during log-in.
    pub password: String,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in the session cookies are set and the client is
/// redirected to the dashboard page. Otherwise, the form is returned with an
/// error message.
pub async fn post_log_in(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let user = match verify_credentials(&state.user_store, &user_data.username, &user_data.password)
    {
        Ok(user) => user,
        Err(Error::InvalidCredentials) => {
            return log_in_page(&user_data.username, Some(INVALID_CREDENTIALS_ERROR_MSG))
                .into_response();
        }
        Err(error) => {
            tracing::error!("unhandled error while verifying credentials: {error}");
            return error.into_response();
        }
    };

    match set_auth_cookie(
        jar,
        user.id(),
        user.username().as_ref(),
        state.cookie_duration,
    ) {
        Ok(jar) => (jar, Redirect::to(endpoints::DASHBOARD_VIEW)).into_response(),
        Err(error) => {
            tracing::error!("error setting the session cookies: {error}");
            crate::html::render_error_page(
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "Something went wrong, please try again later.",
            )
        }
    }
}
