//! Recording, editing, deleting and browsing expenses: the core operations
//! and the routes that expose them.

mod core;
mod routes;

pub use routes::{
    get_edit_expense_page, get_expenses_page, get_new_expense_page, post_create_expense,
    post_delete_expense, post_update_expense,
};

#[cfg(test)]
pub use self::core::{create_expense, get_expense};
