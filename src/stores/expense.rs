//! Defines the expense store trait and the typed query criteria applied
//! uniformly to its list, count and aggregate operations.

use time::Month;

use crate::{
    Error,
    models::{CategoryName, DatabaseID, Expense, ExpenseBuilder, UserID},
};

/// The calendar period an [ExpenseQuery] is restricted to.
///
/// A month filter always carries its year, so a month-without-year query is
/// unrepresentable here and must be rejected before reaching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Match every expense within the given calendar year.
    Year(i32),
    /// Match every expense within the given calendar month.
    Month {
        /// The calendar year.
        year: i32,
        /// The month within `year`.
        month: Month,
    },
}

/// Criteria applied uniformly to list, count and aggregate queries.
///
/// The owning user is always required; the period is optional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpenseQuery {
    /// The user whose expenses should be matched.
    pub user_id: UserID,
    /// Restricts matches to a calendar year or month. `None` applies no date
    /// restriction.
    pub period: Option<Period>,
}

impl ExpenseQuery {
    /// Criteria matching all expenses owned by `user_id`.
    pub fn for_user(user_id: UserID) -> Self {
        Self {
            user_id,
            period: None,
        }
    }

    /// Criteria matching expenses owned by `user_id` within a calendar month.
    pub fn for_month(user_id: UserID, year: i32, month: Month) -> Self {
        Self {
            user_id,
            period: Some(Period::Month { year, month }),
        }
    }
}

/// A per-category aggregate result in decimal dollars.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAmount {
    /// The category the amount was aggregated over.
    pub category: CategoryName,
    /// The aggregated amount in decimal dollars.
    pub amount: f64,
}

/// Handles the creation, retrieval and aggregation of expenses.
pub trait ExpenseStore {
    /// Insert a new expense and return it with its assigned ID.
    fn create(&mut self, builder: ExpenseBuilder) -> Result<Expense, Error>;

    /// Insert many expenses in a single all-or-nothing transaction.
    ///
    /// Implementers must roll back the whole batch if any insert fails.
    fn import(&mut self, builders: Vec<ExpenseBuilder>) -> Result<Vec<Expense>, Error>;

    /// Retrieve an expense by its ID.
    ///
    /// No ownership filter is applied; callers are responsible for checking
    /// that the authenticated user owns the returned expense.
    fn get(&self, id: DatabaseID) -> Result<Expense, Error>;

    /// Replace all mutable fields of the expense with the matching ID.
    ///
    /// The owner cannot be changed by an update.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingExpense] if no expense with the given ID
    /// exists.
    fn update(&mut self, expense: &Expense) -> Result<(), Error>;

    /// Delete the expense with the given ID.
    ///
    /// Deleting an ID that does not exist is not an error, so deletes are
    /// idempotent.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error>;

    /// Retrieve a page of expenses matching `query`, newest first.
    fn get_query(&self, query: ExpenseQuery, offset: u64, limit: u64)
    -> Result<Vec<Expense>, Error>;

    /// Count all expenses matching `query`, independent of pagination.
    fn count(&self, query: ExpenseQuery) -> Result<u64, Error>;

    /// Sum the amounts of all expenses matching `query`, in decimal dollars.
    ///
    /// Returns 0.0 when no rows match.
    fn sum(&self, query: ExpenseQuery) -> Result<f64, Error>;

    /// Sum amounts grouped by category, one entry per category with at least
    /// one matching expense.
    fn sum_by_category(&self, query: ExpenseQuery) -> Result<Vec<CategoryAmount>, Error>;

    /// Average amounts grouped by category, one entry per category with at
    /// least one matching expense.
    fn average_by_category(&self, query: ExpenseQuery) -> Result<Vec<CategoryAmount>, Error>;

    /// The distinct years in which the user recorded at least one expense,
    /// most recent first.
    fn expenditure_years(&self, user_id: UserID) -> Result<Vec<i32>, Error>;
}
