//! This file defines an expense record and the builder that validates its
//! fields before it is persisted.
//!
//! Amounts are handled as integer cents everywhere to avoid floating-point
//! rounding error; conversion to decimal dollars happens only at the edges
//! (display and aggregate queries).

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    models::{CategoryName, DatabaseID, UserID},
};

/// Convert a decimal dollar amount to integer cents, rounding to the nearest
/// cent.
pub fn dollars_to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// A single expense recorded by a user.
///
/// To create an `Expense`, validate the fields with [ExpenseBuilder::new] and
/// insert the builder via [crate::stores::ExpenseStore::create], which
/// assigns the ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    id: DatabaseID,
    user_id: UserID,
    date: Date,
    category: CategoryName,
    amount_cents: i64,
    description: String,
}

impl Expense {
    /// The expense's ID in the database.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The ID of the user that owns this expense.
    ///
    /// The owner is fixed at creation time; there is deliberately no way to
    /// reassign an expense to a different user.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// The calendar date the expense occurred on.
    pub fn date(&self) -> Date {
        self.date
    }

    /// The category label for the expense.
    pub fn category(&self) -> &CategoryName {
        &self.category
    }

    /// The amount spent, in integer cents.
    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }

    /// The amount spent, in decimal dollars.
    pub fn amount_dollars(&self) -> f64 {
        self.amount_cents as f64 / 100.0
    }

    /// A short description of what the expense was for.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Create a copy of this expense with all mutable fields replaced.
    ///
    /// The ID and owner are carried over unchanged. The new field values go
    /// through the same validation as [ExpenseBuilder::new].
    ///
    /// # Errors
    /// Returns the same errors as [ExpenseBuilder::new].
    pub fn with_fields(
        &self,
        amount_cents: i64,
        description: &str,
        date: Date,
        category: &str,
    ) -> Result<Expense, Error> {
        let builder = ExpenseBuilder::new(self.user_id, amount_cents, description, date, category)?;

        Ok(builder.finalise(self.id))
    }
}

/// A validated expense that has not been persisted yet.
///
/// The function for finalizing the builder is
/// [crate::stores::ExpenseStore::create], which inserts the expense and
/// assigns its ID.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBuilder {
    pub(crate) user_id: UserID,
    pub(crate) date: Date,
    pub(crate) category: CategoryName,
    pub(crate) amount_cents: i64,
    pub(crate) description: String,
}

impl ExpenseBuilder {
    /// Validate the fields for a new expense.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NonPositiveAmount] if `amount_cents` is zero or negative,
    /// - [Error::EmptyDescription] if `description` is an empty string,
    /// - [Error::EmptyCategory] if `category` is an empty string,
    /// - [Error::FutureDate] if `date` is after today.
    pub fn new(
        user_id: UserID,
        amount_cents: i64,
        description: &str,
        date: Date,
        category: &str,
    ) -> Result<Self, Error> {
        if amount_cents <= 0 {
            return Err(Error::NonPositiveAmount(amount_cents));
        }

        if description.is_empty() {
            return Err(Error::EmptyDescription);
        }

        let category = CategoryName::new(category)?;

        if date > OffsetDateTime::now_utc().date() {
            return Err(Error::FutureDate(date));
        }

        Ok(Self {
            user_id,
            date,
            category,
            amount_cents,
            description: description.to_string(),
        })
    }

    /// Convert the builder into an [Expense] with the given `id`.
    ///
    /// Intended for use by expense stores after the insert has assigned an ID.
    pub fn finalise(self, id: DatabaseID) -> Expense {
        Expense {
            id,
            user_id: self.user_id,
            date: self.date,
            category: self.category,
            amount_cents: self.amount_cents,
            description: self.description,
        }
    }
}


#[cfg(test)]
mod dollars_to_cents_tests {
    use super::dollars_to_cents;

    #[test]
    fn converts_whole_dollars() {
        assert_eq!(dollars_to_cents(35.0), 3500);
    }

    #[test]
    fn rounds_to_nearest_cent() {
        assert_eq!(dollars_to_cents(19.995), 2000);
        assert_eq!(dollars_to_cents(0.014), 1);
    }
}
