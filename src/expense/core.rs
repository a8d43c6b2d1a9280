//! The expense operations behind the expense routes: create, retrieve,
//! update, delete and the paginated listing.
//!
//! Every operation that touches an existing expense checks that the caller
//! owns it; the stores do not apply ownership filters themselves.

use time::Date;

use crate::{
    Error,
    models::{DatabaseID, Expense, ExpenseBuilder, UserID, dollars_to_cents},
    pagination::page_offset,
    stores::{ExpenseQuery, ExpenseStore},
};

/// One page of a user's expense history.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpensePage {
    /// The expenses on this page, newest first.
    pub expenses: Vec<Expense>,
    /// The number of expenses matching the query across all pages.
    pub total: u64,
}

/// Record a new expense for `user_id`.
///
/// The amount is taken in decimal dollars, as entered in the form, and stored
/// as integer cents.
///
/// # Errors
/// Returns the validation errors of [ExpenseBuilder::new].
pub fn create_expense(
    store: &mut impl ExpenseStore,
    user_id: UserID,
    amount_dollars: f64,
    description: &str,
    date: Date,
    category: &str,
) -> Result<Expense, Error> {
    let builder = ExpenseBuilder::new(
        user_id,
        dollars_to_cents(amount_dollars),
        description,
        date,
        category,
    )?;

    let expense = store.create(builder)?;

    tracing::debug!(
        "recorded expense {} for user {}",
        expense.id(),
        expense.user_id()
    );

    Ok(expense)
}

/// Retrieve a single expense owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the expense does not exist and
/// [Error::Forbidden] if it belongs to another user.
pub fn get_expense(
    store: &impl ExpenseStore,
    user_id: UserID,
    expense_id: DatabaseID,
) -> Result<Expense, Error> {
    let expense = store.get(expense_id)?;

    if expense.user_id() != user_id {
        return Err(Error::Forbidden);
    }

    Ok(expense)
}

/// Replace the mutable fields of an expense owned by `user_id`.
///
/// The owner is never changed by an update.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingExpense] if no expense with the given ID exists,
/// - [Error::Forbidden] if the expense belongs to another user,
/// - the validation errors of [ExpenseBuilder::new] for the new field values.
pub fn update_expense(
    store: &mut impl ExpenseStore,
    user_id: UserID,
    expense_id: DatabaseID,
    amount_dollars: f64,
    description: &str,
    date: Date,
    category: &str,
) -> Result<Expense, Error> {
    let existing = match store.get(expense_id) {
        Ok(expense) => expense,
        Err(Error::NotFound) => return Err(Error::UpdateMissingExpense),
        Err(error) => return Err(error),
    };

    if existing.user_id() != user_id {
        return Err(Error::Forbidden);
    }

    let updated = existing.with_fields(
        dollars_to_cents(amount_dollars),
        description,
        date,
        category,
    )?;
    store.update(&updated)?;

    Ok(updated)
}

/// Delete an expense owned by `user_id`.
///
/// Deleting an expense that does not exist succeeds without effect, so the
/// operation is idempotent.
///
/// # Errors
/// Returns [Error::Forbidden] if the expense belongs to another user.
pub fn delete_expense(
    store: &mut impl ExpenseStore,
    user_id: UserID,
    expense_id: DatabaseID,
) -> Result<(), Error> {
    match store.get(expense_id) {
        Ok(expense) if expense.user_id() != user_id => Err(Error::Forbidden),
        Ok(_) => store.delete(expense_id),
        Err(Error::NotFound) => Ok(()),
        Err(error) => Err(error),
    }
}

/// Retrieve one page of the expenses matching `query`, newest first, along
/// with the total match count for rendering page links.
pub fn list_expenses(
    store: &impl ExpenseStore,
    query: ExpenseQuery,
    page_number: u64,
    page_size: u64,
) -> Result<ExpensePage, Error> {
    let expenses = store.get_query(query, page_offset(page_number, page_size), page_size)?;
    let total = store.count(query)?;

    Ok(ExpensePage { expenses, total })
}
