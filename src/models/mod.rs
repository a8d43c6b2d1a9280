//! This module defines the domain data types.

pub use category::CategoryName;
pub use expense::{Expense, ExpenseBuilder, dollars_to_cents};
pub use password::{MIN_PASSWORD_LENGTH, PasswordHash, ValidatedPassword};
pub use user::{MIN_USERNAME_LENGTH, User, UserID, Username};

mod category;
mod expense;
mod password;
mod user;

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;
