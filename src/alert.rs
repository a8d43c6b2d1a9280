//! Overspending alerts: compares a month's per-category spending against the
//! configured monthly budgets.

use time::Month;

use crate::{
    Error,
    config::CategoryBudgets,
    models::{CategoryName, UserID, dollars_to_cents},
    stores::{ExpenseQuery, ExpenseStore},
};

/// A category whose spending exceeded its monthly budget.
#[derive(Debug, Clone, PartialEq)]
pub struct OverspendingAlert {
    /// The category that went over budget.
    pub category: CategoryName,
    /// The amount spent in the month, in cents.
    pub spent_cents: i64,
    /// The configured monthly budget, in cents.
    pub budget_cents: i64,
}

impl OverspendingAlert {
    /// How far over budget the category is, in cents.
    pub fn overage_cents(&self) -> i64 {
        self.spent_cents - self.budget_cents
    }
}

/// The overspending alerts for `user_id` in the given calendar month.
///
/// A category produces an alert only when it has a configured budget and its
/// spending for the month strictly exceeds it. With no budgets configured or
/// no expenses recorded the result is empty.
pub fn generate_overspending_alerts(
    store: &impl ExpenseStore,
    budgets: &CategoryBudgets,
    user_id: UserID,
    year: i32,
    month: Month,
) -> Result<Vec<OverspendingAlert>, Error> {
    let totals = store.sum_by_category(ExpenseQuery::for_month(user_id, year, month))?;

    let alerts = totals
        .into_iter()
        .filter_map(|total| {
            let budget_cents = budgets.budget_cents(&total.category)?;
            let spent_cents = dollars_to_cents(total.amount);

            (spent_cents > budget_cents).then(|| OverspendingAlert {
                category: total.category,
                spent_cents,
                budget_cents,
            })
        })
        .collect();

    Ok(alerts)
}
