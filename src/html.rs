//! Shared [maud] templates: the base page layout, the navigation bar and the
//! form partials used by more than one page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use time::Month;

use crate::endpoints;

/// The calendar months in order, for the month drop-downs.
pub(crate) const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// The stylesheet shared by every page.
///
/// Inlined into the page head so the app serves no static assets.
const STYLE_SHEET: &str = "\
    body { font-family: sans-serif; max-width: 60rem; margin: 0 auto; padding: 0 1rem; }\
    nav { display: flex; gap: 1rem; align-items: baseline; padding: 0.5rem 0; border-bottom: 1px solid #ccc; }\
    nav .spacer { flex: 1; }\
    table { border-collapse: collapse; }\
    th, td { text-align: left; padding: 0.25rem 1rem 0.25rem 0; }\
    tr { border-bottom: 1px solid #eee; }\
    form.stacked label { display: block; margin-top: 0.75rem; }\
    .error { color: #b00020; }\
    .alert { background: #fff3cd; border: 1px solid #ffe69c; padding: 0.5rem; margin: 0.5rem 0; }\
    .inline-form { display: inline; }";

/// Render a full HTML page with `content` as the body.
pub fn base(page_title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (page_title) }
                style { (PreEscaped(STYLE_SHEET)) }
            }
            body {
                (content)
            }
        }
    }
}

/// The navigation bar shown on pages behind the auth middleware.
pub fn nav_bar(username: &str) -> Markup {
    html! {
        nav {
            a href=(endpoints::DASHBOARD_VIEW) { "Dashboard" }
            a href=(endpoints::EXPENSES_VIEW) { "Expenses" }
            a href=(endpoints::IMPORT_VIEW) { "Import" }
            div .spacer {}
            span { (username) }
            form .inline-form action=(endpoints::LOG_OUT) method="post" {
                button type="submit" { "Log out" }
            }
        }
    }
}

/// A labelled form input, with an optional validation error underneath.
pub fn labelled_input(
    label: &str,
    name: &str,
    input_type: &str,
    value: &str,
    error: Option<&str>,
) -> Markup {
    html! {
        label for=(name) { (label) }
        input id=(name) name=(name) type=(input_type) value=(value) required;
        @if let Some(message) = error {
            p .error { (message) }
        }
    }
}

/// A labelled drop-down with `selected` preselected if it appears in
/// `options`.
pub fn labelled_select<'a>(
    label: &str,
    name: &str,
    options: impl Iterator<Item = &'a str>,
    selected: &str,
) -> Markup {
    html! {
        label for=(name) { (label) }
        select id=(name) name=(name) {
            @for option in options {
                @if option == selected {
                    option value=(option) selected { (option) }
                } @else {
                    option value=(option) { (option) }
                }
            }
        }
    }
}

/// Render a self-contained error page with the given HTTP status code.
///
/// Used as the catch-all response for errors that no route handles
/// specifically.
pub fn render_error_page(status: StatusCode, title: &str, description: &str) -> Response {
    let page = base(
        title,
        html! {
            main {
                h1 { (title) }
                p { (description) }
                a href=(endpoints::ROOT) { "Go back home" }
            }
        },
    );

    (status, page).into_response()
}

#[cfg(test)]
mod html_tests {
    use axum::http::StatusCode;
    use scraper::{Html, Selector};

    use crate::endpoints;

    use super::{base, labelled_input, nav_bar};

    #[test]
    fn base_renders_title_and_content() {
        let markup = base("Test Page", maud::html! { p { "hello" } });
        let document = Html::parse_document(&markup.into_string());

        let title_selector = Selector::parse("title").unwrap();
        let title = document.select(&title_selector).next().unwrap();
        assert_eq!(title.inner_html(), "Test Page");

        let p_selector = Selector::parse("p").unwrap();
        let paragraph = document.select(&p_selector).next().unwrap();
        assert_eq!(paragraph.inner_html(), "hello");
    }

    #[test]
    fn nav_bar_shows_username_and_log_out() {
        let document = Html::parse_fragment(&nav_bar("bobby").into_string());

        let span_selector = Selector::parse("span").unwrap();
        let username = document.select(&span_selector).next().unwrap();
        assert_eq!(username.inner_html(), "bobby");

        let form_selector = Selector::parse("form").unwrap();
        let form = document.select(&form_selector).next().unwrap();
        assert_eq!(form.attr("action"), Some(endpoints::LOG_OUT));
    }

    #[test]
    fn labelled_input_renders_error_message() {
        let markup = labelled_input("Amount", "amount", "number", "", Some("must be positive"));
        let document = Html::parse_fragment(&markup.into_string());

        let error_selector = Selector::parse("p.error").unwrap();
        let error = document.select(&error_selector).next().unwrap();
        assert_eq!(error.inner_html(), "must be positive");
    }

    #[test]
    fn error_page_sets_status_code() {
        let response = super::render_error_page(StatusCode::NOT_FOUND, "Not Found", "no such page");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
