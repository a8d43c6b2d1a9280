//! The monthly dashboard: total expenditure, per-category breakdowns and
//! overspending alerts for a selected calendar month.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::{Month, OffsetDateTime};

use crate::{
    AppState, Error,
    alert::{OverspendingAlert, generate_overspending_alerts},
    auth::AuthContext,
    endpoints,
    html::{MONTHS, base, nav_bar},
    stores::{CategoryAmount, ExpenseStore},
    summary::{
        compute_per_category_averages, compute_per_category_totals, compute_total_expenditure,
    },
};

/// The query string parameters accepted by the dashboard.
///
/// Both default to the current calendar month when absent.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    /// The calendar year to summarize.
    pub year: Option<String>,
    /// The calendar month (1-12) to summarize.
    pub month: Option<String>,
}

fn parse_selected_month(params: &DashboardParams) -> Result<(i32, Month), Error> {
    let today = OffsetDateTime::now_utc().date();

    let year = match params.year.as_deref().filter(|year| !year.is_empty()) {
        Some(year) => year
            .parse()
            .map_err(|_| Error::InvalidPeriodFilter(format!("'{year}' is not a valid year")))?,
        None => today.year(),
    };

    let month = match params.month.as_deref().filter(|month| !month.is_empty()) {
        Some(month) => month
            .parse::<u8>()
            .ok()
            .and_then(|number| Month::try_from(number).ok())
            .ok_or_else(|| {
                Error::InvalidPeriodFilter(format!("'{month}' is not a valid month"))
            })?,
        None => today.month(),
    };

    Ok((year, month))
}

fn month_selector(years: &[i32], selected_year: i32, selected_month: Month) -> Markup {
    html! {
        form action=(endpoints::DASHBOARD_VIEW) method="get" {
            label for="year" { "Year" }
            select id="year" name="year" {
                @if !years.contains(&selected_year) {
                    option value=(selected_year) selected { (selected_year) }
                }
                @for year in years {
                    @if *year == selected_year {
                        option value=(year) selected { (year) }
                    } @else {
                        option value=(year) { (year) }
                    }
                }
            }
            label for="month" { "Month" }
            select id="month" name="month" {
                @for month in MONTHS {
                    @if month == selected_month {
                        option value=(month as u8) selected { (month) }
                    } @else {
                        option value=(month as u8) { (month) }
                    }
                }
            }
            button type="submit" { "Show" }
        }
    }
}

fn alert_banner(alert: &OverspendingAlert) -> Markup {
    html! {
        div .alert {
            "Overspent on " (alert.category) ": spent "
            (format!("${:.2}", alert.spent_cents as f64 / 100.0))
            " of a "
            (format!("${:.2}", alert.budget_cents as f64 / 100.0))
            " budget ("
            (format!("${:.2}", alert.overage_cents() as f64 / 100.0))
            " over)."
        }
    }
}

fn category_table(caption: &str, rows: &[CategoryAmount]) -> Markup {
    html! {
        h2 { (caption) }
        @if rows.is_empty() {
            p { "No expenses this month." }
        } @else {
            table {
                thead {
                    tr {
                        th { "Category" }
                        th { "Amount" }
                    }
                }
                tbody {
                    @for row in rows {
                        tr {
                            td { (row.category) }
                            td { (format!("${:.2}", row.amount)) }
                        }
                    }
                }
            }
        }
    }
}

/// Display the dashboard for the selected calendar month.
pub async fn get_dashboard_page(
    State(state): State<AppState>,
    Extension(auth_context): Extension<AuthContext>,
    Query(params): Query<DashboardParams>,
) -> Response {
    let (year, month) = match parse_selected_month(&params) {
        Ok(selected) => selected,
        Err(error) => return error.into_response(),
    };

    let store = &state.expense_store;
    let user_id = auth_context.user_id;

    let page = compute_total_expenditure(store, user_id, year, month)
        .and_then(|total| {
            let totals = compute_per_category_totals(store, user_id, year, month)?;
            let averages = compute_per_category_averages(store, user_id, year, month)?;
            let alerts =
                generate_overspending_alerts(store, &state.config.budgets, user_id, year, month)?;
            let years = store.expenditure_years(user_id)?;

            Ok(base(
                "Dashboard",
                html! {
                    (nav_bar(&auth_context.username))
                    main {
                        h1 { "Dashboard" }
                        (month_selector(&years, year, month))
                        @for alert in &alerts {
                            (alert_banner(alert))
                        }
                        h2 { (month) " " (year) }
                        p { "Total spent: " (format!("${total:.2}")) }
                        (category_table("Totals per category", &totals))
                        (category_table("Average expense per category", &averages))
                    }
                },
            ))
        });

    match page {
        Ok(page) => page.into_response(),
        Err(error) => error.into_response(),
    }
}
