//! SQLite implementations of the store traits.

pub mod expense;
pub mod user;

pub use expense::SQLiteExpenseStore;
pub use user::SQLiteUserStore;
