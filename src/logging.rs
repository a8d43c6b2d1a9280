//! Middleware for logging requests and responses.

use std::time::Instant;

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{Method, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};

/// Form fields whose values are never written to the logs.
const REDACTED_FIELDS: [&str; 2] = ["confirm_password", "password"];

/// Bodies longer than this are truncated at the `info` level and logged in
/// full at the `debug` level.
const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log each request and its response.
///
/// Requests and responses are logged at the `info` level. Password fields in
/// URL-encoded form bodies are redacted before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let started_at = Instant::now();

    let (parts, body_text) = buffer_request(request).await;

    let is_form_post = parts.method == Method::POST
        && parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    let display_text = if is_form_post {
        REDACTED_FIELDS
            .iter()
            .fold(body_text.clone(), |text, field| redact_field(&text, field))
    } else {
        body_text.clone()
    };

    log_body(
        &format!("received {} {}", parts.method, parts.uri),
        &display_text,
    );

    let request = Request::from_parts(parts, Body::from(body_text));
    let response = next.run(request).await;

    let (parts, body_text) = buffer_response(response).await;
    log_body(
        &format!(
            "responding {} after {:?}",
            parts.status,
            started_at.elapsed()
        ),
        &body_text,
    );

    Response::from_parts(parts, Body::from(body_text))
}

/// Replace the value of `field_name` in a URL-encoded form body with
/// asterisks.
fn redact_field(form_text: &str, field_name: &str) -> String {
    let prefix = format!("{field_name}=");

    let start = match form_text.find(&prefix) {
        Some(position) => position,
        None => return form_text.to_string(),
    };

    let end = form_text[start..]
        .find('&')
        .map(|position| start + position)
        .unwrap_or(form_text.len());

    let mut redacted = form_text.to_string();
    redacted.replace_range(start..end, &format!("{field_name}=********"));

    redacted
}

async fn buffer_request(request: Request) -> (axum::http::request::Parts, String) {
    let (parts, body) = request.into_parts();
    let body_text = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(error) => {
            tracing::warn!("could not buffer request body for logging: {error}");
            String::new()
        }
    };

    (parts, body_text)
}

async fn buffer_response(response: Response) -> (axum::http::response::Parts, String) {
    let (parts, body) = response.into_parts();
    let body_text = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(error) => {
            tracing::warn!("could not buffer response body for logging: {error}");
            String::new()
        }
    };

    (parts, body_text)
}

fn log_body(summary: &str, body: &str) {
    if body.chars().count() > LOG_BODY_LENGTH_LIMIT {
        let truncated: String = body.chars().take(LOG_BODY_LENGTH_LIMIT).collect();
        tracing::info!("{summary} body: {truncated}...");
        tracing::debug!("{summary} full body: {body:?}");
    } else {
        tracing::info!("{summary} body: {body:?}");
    }
}

#[cfg(test)]
mod logging_tests {
    use super::redact_field;

    #[test]
    fn redacts_password_in_middle_of_form() {
        let form = "username=bobby&password=secret123&remember=on";

        assert_eq!(
            redact_field(form, "password"),
            "username=bobby&password=********&remember=on"
        );
    }

    #[test]
    fn redacts_password_at_end_of_form() {
        let form = "username=bobby&password=secret123";

        assert_eq!(
            redact_field(form, "password"),
            "username=bobby&password=********"
        );
    }

    #[test]
    fn leaves_form_without_password_unchanged() {
        let form = "username=bobby&remember=on";

        assert_eq!(redact_field(form, "password"), form);
    }
}
