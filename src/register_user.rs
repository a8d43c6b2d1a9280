//! The registration page for creating a new account.
//!
//! The auth module handles the lower level validation and password hashing.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::register_user,
    endpoints,
    html::{base, labelled_input},
    models::{MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH, PasswordHash},
};

/// The validation errors shown next to the registration form fields.
#[derive(Debug, Default)]
struct RegistrationErrors {
    username: Option<String>,
    password: Option<String>,
    confirm_password: Option<String>,
}

fn registration_page(username: &str, errors: RegistrationErrors) -> Markup {
    base(
        "Register",
        html! {
            main {
                h1 { "Create an account" }
                p { (registration_rules_hint()) }
                form .stacked action=(endpoints::USERS_API) method="post" {
                    (labelled_input(
                        "Username",
                        "username",
                        "text",
                        username,
                        errors.username.as_deref(),
                    ))
                    (labelled_input(
                        "Password",
                        "password",
                        "password",
                        "",
                        errors.password.as_deref(),
                    ))
                    (labelled_input(
                        "Confirm password",
                        "confirm_password",
                        "password",
                        "",
                        errors.confirm_password.as_deref(),
                    ))
                    button type="submit" { "Register" }
                }
                p {
                    "Already have an account? "
                    a href=(endpoints::LOG_IN_VIEW) { "Log in here" }
                }
            }
        },
    )
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    registration_page("", RegistrationErrors::default()).into_response()
}

/// The raw data entered by the user in the registration form.
#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    /// The requested username.
    pub username: String,
    /// The requested password.
    pub password: String,
    /// The password typed a second time, to catch typos.
    pub confirm_password: String,
}

/// Handler for registration requests via the POST method.
///
/// On success the client is redirected to the log-in page. On a validation
/// error the form is re-rendered with an error message next to the offending
/// field and the entered username preserved.
pub async fn post_register_user(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.confirm_password {
        return registration_page(
            &form.username,
            RegistrationErrors {
                confirm_password: Some("Passwords do not match.".to_string()),
                ..Default::default()
            },
        )
        .into_response();
    }

    let mut store = state.user_store.clone();

    match register_user(
        &mut store,
        &form.username,
        &form.password,
        PasswordHash::DEFAULT_COST,
    ) {
        Ok(_) => Redirect::to(endpoints::LOG_IN_VIEW).into_response(),
        Err(error @ Error::UsernameTooShort(_)) => registration_page(
            &form.username,
            RegistrationErrors {
                username: Some(error.to_string()),
                ..Default::default()
            },
        )
        .into_response(),
        Err(Error::DuplicateUsername) => registration_page(
            &form.username,
            RegistrationErrors {
                username: Some(format!(
                    "The username '{}' is already taken.",
                    form.username
                )),
                ..Default::default()
            },
        )
        .into_response(),
        Err(error @ (Error::PasswordTooShort(_) | Error::PasswordMissingDigit)) => {
            registration_page(
                &form.username,
                RegistrationErrors {
                    password: Some(error.to_string()),
                    ..Default::default()
                },
            )
            .into_response()
        }
        Err(error) => {
            tracing::error!("unhandled error while registering a user: {error}");
            error.into_response()
        }
    }
}

/// Shown on the form so users do not have to guess the rules.
fn registration_rules_hint() -> String {
    format!(
        "Usernames must be at least {MIN_USERNAME_LENGTH} characters. Passwords must be at \
         least {MIN_PASSWORD_LENGTH} characters and contain a digit."
    )
}


#[cfg(test)]
mod post_register_user_tests {
    use axum::{Router, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{AppState, endpoints};

    use super::{RegisterForm, post_register_user};

    fn get_test_server() -> TestServer {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::new(conn, "42", Default::default(), Default::default()).unwrap();

        let app = Router::new()
            .route(endpoints::USERS_API, post(post_register_user))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn register_redirects_to_log_in_on_success() {
        let server = get_test_server();

        let response = server
            .post(endpoints::USERS_API)
            .form(&RegisterForm {
                username: "bobby".to_string(),
                password: "secret123".to_string(),
                confirm_password: "secret123".to_string(),
            })
            .await;

        response.assert_status_see_other();
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::LOG_IN_VIEW
        );
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let server = get_test_server();
        let form = RegisterForm {
            username: "bobby".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
        };

        server.post(endpoints::USERS_API).form(&form).await;
        let response = server.post(endpoints::USERS_API).form(&form).await;

        assert_error_message_contains(&response.text(), "already taken");
    }

    #[tokio::test]
    async fn register_rejects_short_password_and_keeps_username() {
        let server = get_test_server();

        let response = server
            .post(endpoints::USERS_API)
            .form(&RegisterForm {
                username: "bobby".to_string(),
                password: "short1".to_string(),
                confirm_password: "short1".to_string(),
            })
            .await;

        let text = response.text();
        assert_error_message_contains(&text, "at least 8 characters");

        let document = Html::parse_document(&text);
        let username_selector = Selector::parse("input[name=username]").unwrap();
        let username_input = document.select(&username_selector).next().unwrap();
        assert_eq!(username_input.attr("value"), Some("bobby"));
    }

    #[tokio::test]
    async fn register_rejects_password_without_digit() {
        let server = get_test_server();

        let response = server
            .post(endpoints::USERS_API)
            .form(&RegisterForm {
                username: "bobby".to_string(),
                password: "nodigitshere".to_string(),
                confirm_password: "nodigitshere".to_string(),
            })
            .await;

        assert_error_message_contains(&response.text(), "digit");
    }

    #[tokio::test]
    async fn register_rejects_mismatched_passwords() {
        let server = get_test_server();

        let response = server
            .post(endpoints::USERS_API)
            .form(&RegisterForm {
                username: "bobby".to_string(),
                password: "secret123".to_string(),
                confirm_password: "secret124".to_string(),
            })
            .await;

        assert_error_message_contains(&response.text(), "do not match");
    }

    #[track_caller]
    fn assert_error_message_contains(body: &str, message: &str) {
        let document = Html::parse_document(body);
        let error_selector = Selector::parse("p.error").unwrap();
        let errors: Vec<String> = document
            .select(&error_selector)
            .map(|error| error.text().collect())
            .collect();

        assert!(
            errors.iter().any(|error| error.contains(message)),
            "no error message containing '{message}' in {errors:?}"
        );
    }
}
