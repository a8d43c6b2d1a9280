//! Monthly expenditure summaries: the total and the per-category breakdowns
//! shown on the dashboard.

use time::Month;

use crate::{
    Error,
    models::UserID,
    stores::{CategoryAmount, ExpenseQuery, ExpenseStore},
};

/// The total amount spent by `user_id` in the given calendar month, in
/// decimal dollars. Zero when no expenses were recorded.
pub fn compute_total_expenditure(
    store: &impl ExpenseStore,
    user_id: UserID,
    year: i32,
    month: Month,
) -> Result<f64, Error> {
    store.sum(ExpenseQuery::for_month(user_id, year, month))
}

/// The amount spent per category in the given calendar month.
///
/// Categories without any expenses in the month are not included.
pub fn compute_per_category_totals(
    store: &impl ExpenseStore,
    user_id: UserID,
    year: i32,
    month: Month,
) -> Result<Vec<CategoryAmount>, Error> {
    store.sum_by_category(ExpenseQuery::for_month(user_id, year, month))
}

/// The average expense amount per category in the given calendar month.
pub fn compute_per_category_averages(
    store: &impl ExpenseStore,
    user_id: UserID,
    year: i32,
    month: Month,
) -> Result<Vec<CategoryAmount>, Error> {
    store.average_by_category(ExpenseQuery::for_month(user_id, year, month))
}

#[cfg(test)]
mod summary_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Month, macros::date};

    use crate::{
        db::initialize,
        models::{ExpenseBuilder, PasswordHash, UserID, Username},
        stores::{ExpenseStore, UserStore, sqlite::{SQLiteExpenseStore, SQLiteUserStore}},
    };

    use super::{
        compute_per_category_averages, compute_per_category_totals, compute_total_expenditure,
    };

    fn get_store() -> (SQLiteExpenseStore, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let connection = Arc::new(Mutex::new(conn));

        let user = SQLiteUserStore::new(connection.clone())
            .create(
                Username::new("bobby").unwrap(),
                PasswordHash::new_unchecked("hunter2"),
            )
            .unwrap();

        let mut store = SQLiteExpenseStore::new(connection);

        for (cents, description, date, category) in [
            (2000, "fruit and veg", date!(2024 - 03 - 02), "groceries"),
            (1500, "butcher", date!(2024 - 03 - 16), "groceries"),
            (500, "bus fare", date!(2024 - 03 - 10), "transport"),
            (9999, "different month", date!(2024 - 04 - 01), "groceries"),
        ] {
            store
                .create(
                    ExpenseBuilder::new(user.id(), cents, description, date, category).unwrap(),
                )
                .unwrap();
        }

        (store, user.id())
    }

    #[test]
    fn total_sums_only_the_requested_month() {
        let (store, user) = get_store();

        let total = compute_total_expenditure(&store, user, 2024, Month::March).unwrap();

        assert_eq!(total, 40.00);
    }

    #[test]
    fn total_is_zero_for_empty_month() {
        let (store, user) = get_store();

        let total = compute_total_expenditure(&store, user, 2024, Month::January).unwrap();

        assert_eq!(total, 0.0);
    }

    #[test]
    fn per_category_totals_group_by_category() {
        let (store, user) = get_store();

        let totals = compute_per_category_totals(&store, user, 2024, Month::March).unwrap();

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category.as_ref(), "groceries");
        assert_eq!(totals[0].amount, 35.00);
        assert_eq!(totals[1].category.as_ref(), "transport");
        assert_eq!(totals[1].amount, 5.00);
    }

    #[test]
    fn per_category_averages_divide_by_expense_count() {
        let (store, user) = get_store();

        let averages = compute_per_category_averages(&store, user, 2024, Month::March).unwrap();

        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].category.as_ref(), "groceries");
        assert_eq!(averages[0].amount, 17.50);
        assert_eq!(averages[1].category.as_ref(), "transport");
        assert_eq!(averages[1].amount, 5.00);
    }
}
