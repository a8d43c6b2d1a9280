//! The routes for the expense history page, the record/edit forms and the
//! form submission endpoints.

use axum::{
    Extension, Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, Month, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    auth::AuthContext,
    endpoints::{self, format_endpoint},
    html::{MONTHS, base, labelled_input, labelled_select, nav_bar},
    models::{CategoryName, DatabaseID, Expense},
    pagination::page_count,
    stores::{ExpenseQuery, ExpenseStore, Period},
};

use super::core::{create_expense, delete_expense, get_expense, list_expenses, update_expense};

/// The format used by HTML date inputs.
const DATE_INPUT_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The raw data entered by the user in the record/edit expense forms.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseForm {
    /// The amount spent, in decimal dollars.
    pub amount: f64,
    /// The date of the expense, as `YYYY-MM-DD` from the date input.
    pub date: String,
    /// The category label.
    pub category: String,
    /// A short description of the expense.
    pub description: String,
}

/// The query string parameters accepted by the expense history page.
///
/// The year and month arrive as strings because an unselected filter is
/// submitted as an empty value.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseListParams {
    /// The 1-based page number.
    pub page: Option<u64>,
    /// The calendar year to filter by.
    pub year: Option<String>,
    /// The calendar month (1-12) to filter by. Requires `year`.
    pub month: Option<String>,
}

/// The period filter parsed out of [ExpenseListParams].
fn parse_period(params: &ExpenseListParams) -> Result<Option<Period>, Error> {
    let year = match params.year.as_deref().filter(|year| !year.is_empty()) {
        Some(year) => Some(
            year.parse::<i32>()
                .map_err(|_| Error::InvalidPeriodFilter(format!("'{year}' is not a valid year")))?,
        ),
        None => None,
    };

    let month = match params.month.as_deref().filter(|month| !month.is_empty()) {
        Some(month) => Some(
            month
                .parse::<u8>()
                .ok()
                .and_then(|number| Month::try_from(number).ok())
                .ok_or_else(|| {
                    Error::InvalidPeriodFilter(format!("'{month}' is not a valid month"))
                })?,
        ),
        None => None,
    };

    match (year, month) {
        (Some(year), Some(month)) => Ok(Some(Period::Month { year, month })),
        (Some(year), None) => Ok(Some(Period::Year(year))),
        (None, Some(_)) => Err(Error::InvalidPeriodFilter(
            "a month filter requires a year".to_string(),
        )),
        (None, None) => Ok(None),
    }
}

fn expense_row(expense: &Expense) -> Markup {
    html! {
        tr {
            td { (expense.date()) }
            td { (expense.category()) }
            td { (expense.description()) }
            td { (format!("${:.2}", expense.amount_dollars())) }
            td {
                a href=(format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id())) { "Edit" }
            }
            td {
                form .inline-form
                    action=(format_endpoint(endpoints::DELETE_EXPENSE, expense.id()))
                    method="post"
                {
                    button type="submit" { "Delete" }
                }
            }
        }
    }
}

fn filter_form(years: &[i32], params: &ExpenseListParams) -> Markup {
    let selected_year = params.year.clone().unwrap_or_default();
    let selected_month = params.month.clone().unwrap_or_default();

    html! {
        form action=(endpoints::EXPENSES_VIEW) method="get" {
            label for="year" { "Year" }
            select id="year" name="year" {
                option value="" { "All" }
                @for year in years {
                    @if selected_year == year.to_string() {
                        option value=(year) selected { (year) }
                    } @else {
                        option value=(year) { (year) }
                    }
                }
            }
            label for="month" { "Month" }
            select id="month" name="month" {
                option value="" { "All" }
                @for month in MONTHS {
                    @let number = month as u8;
                    @if selected_month == number.to_string() {
                        option value=(number) selected { (month) }
                    } @else {
                        option value=(number) { (month) }
                    }
                }
            }
            button type="submit" { "Filter" }
        }
    }
}

fn page_link(page_number: u64, params: &ExpenseListParams) -> String {
    let mut link = format!("{}?page={page_number}", endpoints::EXPENSES_VIEW);

    if let Some(year) = params.year.as_deref().filter(|year| !year.is_empty()) {
        link.push_str(&format!("&year={year}"));
    }

    if let Some(month) = params.month.as_deref().filter(|month| !month.is_empty()) {
        link.push_str(&format!("&month={month}"));
    }

    link
}

fn pagination_links(page_number: u64, total_pages: u64, params: &ExpenseListParams) -> Markup {
    html! {
        p {
            @if page_number > 1 {
                a href=(page_link(page_number - 1, params)) { "Previous" }
                " "
            }
            "Page " (page_number) " of " (total_pages)
            @if page_number < total_pages {
                " "
                a href=(page_link(page_number + 1, params)) { "Next" }
            }
        }
    }
}

/// Display the paginated expense history with the year/month filter.
pub async fn get_expenses_page(
    State(state): State<AppState>,
    Extension(auth_context): Extension<AuthContext>,
    Query(params): Query<ExpenseListParams>,
) -> Response {
    let period = match parse_period(&params) {
        Ok(period) => period,
        Err(error) => return error.into_response(),
    };

    let query = ExpenseQuery {
        user_id: auth_context.user_id,
        period,
    };

    let page_number = params.page.unwrap_or(state.pagination_config.default_page);
    let page_size = state.pagination_config.default_page_size;

    let page = match list_expenses(&state.expense_store, query, page_number, page_size) {
        Ok(page) => page,
        Err(error) => return error.into_response(),
    };

    let years = match state.expense_store.expenditure_years(auth_context.user_id) {
        Ok(years) => years,
        Err(error) => return error.into_response(),
    };

    let total_pages = page_count(page.total, page_size);

    base(
        "Expenses",
        html! {
            (nav_bar(&auth_context.username))
            main {
                h1 { "Expenses" }
                a href=(endpoints::NEW_EXPENSE_VIEW) { "Record an expense" }
                (filter_form(&years, &params))
                @if page.expenses.is_empty() {
                    p { "No expenses found." }
                } @else {
                    table {
                        thead {
                            tr {
                                th { "Date" }
                                th { "Category" }
                                th { "Description" }
                                th { "Amount" }
                                th {}
                                th {}
                            }
                        }
                        tbody {
                            @for expense in &page.expenses {
                                (expense_row(expense))
                            }
                        }
                    }
                }
                (pagination_links(page_number, total_pages, &params))
            }
        },
    )
    .into_response()
}

fn expense_form_page(
    title: &str,
    action: &str,
    username: &str,
    categories: &[CategoryName],
    form: &ExpenseForm,
    error_message: Option<&str>,
) -> Markup {
    base(
        title,
        html! {
            (nav_bar(username))
            main {
                h1 { (title) }
                @if let Some(message) = error_message {
                    p .error { (message) }
                }
                form .stacked action=(action) method="post" {
                    (labelled_input(
                        "Amount",
                        "amount",
                        "number",
                        &if form.amount > 0.0 { format!("{:.2}", form.amount) } else { String::new() },
                        None,
                    ))
                    (labelled_input("Date", "date", "date", &form.date, None))
                    (labelled_select(
                        "Category",
                        "category",
                        categories.iter().map(AsRef::as_ref),
                        &form.category,
                    ))
                    (labelled_input("Description", "description", "text", &form.description, None))
                    button type="submit" { "Save" }
                }
                a href=(endpoints::EXPENSES_VIEW) { "Back to expenses" }
            }
        },
    )
}

/// Display the form for recording a new expense, dated today by default.
pub async fn get_new_expense_page(
    State(state): State<AppState>,
    Extension(auth_context): Extension<AuthContext>,
) -> Response {
    let form = ExpenseForm {
        amount: 0.0,
        date: OffsetDateTime::now_utc()
            .date()
            .format(DATE_INPUT_FORMAT)
            .unwrap_or_default(),
        category: String::new(),
        description: String::new(),
    };

    expense_form_page(
        "Record expense",
        endpoints::EXPENSES_API,
        &auth_context.username,
        &state.config.categories,
        &form,
        None,
    )
    .into_response()
}

/// Handler for creating an expense via the POST method.
///
/// Redirects to the expense history on success; re-renders the form with an
/// error message when validation fails.
pub async fn post_create_expense(
    State(state): State<AppState>,
    Extension(auth_context): Extension<AuthContext>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let date = match Date::parse(&form.date, DATE_INPUT_FORMAT) {
        Ok(date) => date,
        Err(_) => {
            return render_form_error(
                "Record expense",
                endpoints::EXPENSES_API,
                &state,
                &auth_context,
                &form,
                "The date must be in the format YYYY-MM-DD.",
            );
        }
    };

    let mut store = state.expense_store.clone();

    match create_expense(
        &mut store,
        auth_context.user_id,
        form.amount,
        &form.description,
        date,
        &form.category,
    ) {
        Ok(_) => Redirect::to(endpoints::EXPENSES_VIEW).into_response(),
        Err(error) if error.is_validation_error() => render_form_error(
            "Record expense",
            endpoints::EXPENSES_API,
            &state,
            &auth_context,
            &form,
            &error.to_string(),
        ),
        Err(error) => error.into_response(),
    }
}

/// Display the form for editing an existing expense, pre-filled with its
/// current field values.
pub async fn get_edit_expense_page(
    State(state): State<AppState>,
    Extension(auth_context): Extension<AuthContext>,
    Path(expense_id): Path<DatabaseID>,
) -> Response {
    let expense = match get_expense(&state.expense_store, auth_context.user_id, expense_id) {
        Ok(expense) => expense,
        Err(error) => return error.into_response(),
    };

    let form = ExpenseForm {
        amount: expense.amount_dollars(),
        date: expense
            .date()
            .format(DATE_INPUT_FORMAT)
            .unwrap_or_default(),
        category: expense.category().as_ref().to_string(),
        description: expense.description().to_string(),
    };

    expense_form_page(
        "Edit expense",
        &format_endpoint(endpoints::UPDATE_EXPENSE, expense_id),
        &auth_context.username,
        &state.config.categories,
        &form,
        None,
    )
    .into_response()
}

/// Handler for updating an expense via the POST method.
pub async fn post_update_expense(
    State(state): State<AppState>,
    Extension(auth_context): Extension<AuthContext>,
    Path(expense_id): Path<DatabaseID>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let action = format_endpoint(endpoints::UPDATE_EXPENSE, expense_id);

    let date = match Date::parse(&form.date, DATE_INPUT_FORMAT) {
        Ok(date) => date,
        Err(_) => {
            return render_form_error(
                "Edit expense",
                &action,
                &state,
                &auth_context,
                &form,
                "The date must be in the format YYYY-MM-DD.",
            );
        }
    };

    let mut store = state.expense_store.clone();

    match update_expense(
        &mut store,
        auth_context.user_id,
        expense_id,
        form.amount,
        &form.description,
        date,
        &form.category,
    ) {
        Ok(_) => Redirect::to(endpoints::EXPENSES_VIEW).into_response(),
        Err(error) if error.is_validation_error() => render_form_error(
            "Edit expense",
            &action,
            &state,
            &auth_context,
            &form,
            &error.to_string(),
        ),
        Err(error) => error.into_response(),
    }
}

/// Handler for deleting an expense via the POST method.
///
/// Succeeds and redirects even if the expense was already deleted.
pub async fn post_delete_expense(
    State(state): State<AppState>,
    Extension(auth_context): Extension<AuthContext>,
    Path(expense_id): Path<DatabaseID>,
) -> Response {
    let mut store = state.expense_store.clone();

    match delete_expense(&mut store, auth_context.user_id, expense_id) {
        Ok(()) => Redirect::to(endpoints::EXPENSES_VIEW).into_response(),
        Err(error) => error.into_response(),
    }
}

fn render_form_error(
    title: &str,
    action: &str,
    state: &AppState,
    auth_context: &AuthContext,
    form: &ExpenseForm,
    message: &str,
) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        expense_form_page(
            title,
            action,
            &auth_context.username,
            &state.config.categories,
            form,
            Some(message),
        ),
    )
        .into_response()
}
