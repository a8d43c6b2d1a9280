//! Importing expenses in bulk from CSV files.
//!
//! Files must have the header `date,category,amount,description` with dates
//! as `YYYY-MM-DD` and amounts in decimal dollars. A whole upload is imported
//! in a single transaction: one bad row rejects the entire file.

use axum::{
    Extension,
    extract::{Multipart, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    auth::AuthContext,
    endpoints,
    html::{base, nav_bar},
    models::{ExpenseBuilder, UserID, dollars_to_cents},
    stores::ExpenseStore,
};

const CSV_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// One row of an expense CSV file.
#[derive(Debug, Deserialize)]
struct CsvExpenseRow {
    date: String,
    category: String,
    amount: f64,
    description: String,
}

/// Parse the text of a CSV file into validated expense builders for
/// `user_id`.
///
/// # Errors
/// Returns [Error::InvalidCsv] naming the offending row when the file cannot
/// be parsed or a row fails expense validation.
pub fn parse_expenses_csv(user_id: UserID, csv_text: &str) -> Result<Vec<ExpenseBuilder>, Error> {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let mut builders = Vec::new();

    for (index, record) in reader.deserialize::<CsvExpenseRow>().enumerate() {
        // Row 1 is the header.
        let row_number = index + 2;

        let row = record.map_err(|error| {
            Error::InvalidCsv(format!("row {row_number} is malformed: {error}"))
        })?;

        let date = Date::parse(&row.date, CSV_DATE_FORMAT).map_err(|_| {
            Error::InvalidCsv(format!(
                "row {row_number}: '{}' is not a date in the format YYYY-MM-DD",
                row.date
            ))
        })?;

        let builder = ExpenseBuilder::new(
            user_id,
            dollars_to_cents(row.amount),
            &row.description,
            date,
            &row.category,
        )
        .map_err(|error| Error::InvalidCsv(format!("row {row_number}: {error}")))?;

        builders.push(builder);
    }

    Ok(builders)
}

fn import_page(username: &str, message: Option<Markup>) -> Markup {
    base(
        "Import expenses",
        html! {
            (nav_bar(username))
            main {
                h1 { "Import expenses" }
                @if let Some(message) = message {
                    (message)
                }
                p {
                    "Upload one or more CSV files with the header "
                    code { "date,category,amount,description" }
                    ", dates as YYYY-MM-DD and amounts in dollars."
                }
                form .stacked
                    action=(endpoints::IMPORT_API)
                    method="post"
                    enctype="multipart/form-data"
                {
                    label for="files" { "CSV files" }
                    input id="files" name="files" type="file" accept="text/csv" multiple required;
                    button type="submit" { "Import" }
                }
                a href=(endpoints::EXPENSES_VIEW) { "Back to expenses" }
            }
        },
    )
}

/// Display the CSV import page.
pub async fn get_import_page(Extension(auth_context): Extension<AuthContext>) -> Response {
    import_page(&auth_context.username, None).into_response()
}

/// Handler for CSV imports via the POST method.
///
/// All uploaded files are parsed first and the expenses are inserted in one
/// all-or-nothing transaction, so a bad row leaves the database untouched.
pub async fn post_import_expenses(
    State(state): State<AppState>,
    Extension(auth_context): Extension<AuthContext>,
    mut multipart: Multipart,
) -> Response {
    let mut builders = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(error) => {
                tracing::error!("could not read multipart form: {error}");
                return import_error(
                    &auth_context.username,
                    "The upload could not be read, please try again.",
                );
            }
        };

        let csv_text = match read_csv_field(field).await {
            Ok(text) => text,
            Err(message) => return import_error(&auth_context.username, &message),
        };

        match parse_expenses_csv(auth_context.user_id, &csv_text) {
            Ok(parsed) => builders.extend(parsed),
            Err(error) => return import_error(&auth_context.username, &error.to_string()),
        }
    }

    if builders.is_empty() {
        return import_error(&auth_context.username, "No expense rows were found.");
    }

    let mut store = state.expense_store.clone();

    match store.import(builders) {
        Ok(imported) => {
            tracing::info!(
                "imported {} expenses for user {}",
                imported.len(),
                auth_context.user_id
            );

            (
                StatusCode::CREATED,
                import_page(
                    &auth_context.username,
                    Some(html! {
                        div .alert {
                            "Imported " (imported.len()) " expenses. "
                            a href=(endpoints::EXPENSES_VIEW) { "View them here." }
                        }
                    }),
                ),
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("failed to import expenses: {error}");
            error.into_response()
        }
    }
}

async fn read_csv_field(field: Field<'_>) -> Result<String, String> {
    if field.content_type() != Some("text/csv") {
        return Err("File type must be CSV.".to_string());
    }

    let file_name = field.file_name().unwrap_or("<unnamed>").to_owned();

    match field.text().await {
        Ok(text) => {
            tracing::debug!("received file '{file_name}' that is {} bytes", text.len());
            Ok(text)
        }
        Err(error) => {
            tracing::error!("could not read data from multipart field: {error}");
            Err("The upload could not be read, please try again.".to_string())
        }
    }
}

fn import_error(username: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        import_page(
            username,
            Some(html! {
                p .error { (message) }
            }),
        ),
    )
        .into_response()
}
