//! Contains traits and implementations for objects that store the domain
//! [models](crate::models).

mod expense;
mod user;

pub mod sqlite;

pub use expense::{CategoryAmount, ExpenseQuery, ExpenseStore, Period};
pub use user::UserStore;
