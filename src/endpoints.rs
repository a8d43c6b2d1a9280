//! The application's route URIs.
//!
//! For endpoints that take a parameter, e.g., '/expenses/{expense_id}/edit',
//! use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying a user's expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for recording a new expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
/// The page for editing an existing expense.
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{expense_id}/edit";
/// The page for importing expenses from a CSV file.
pub const IMPORT_VIEW: &str = "/expenses/import";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";

/// The route for registering a user.
pub const USERS_API: &str = "/api/users";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to create an expense.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to update an expense.
///
/// POST is used rather than PUT because the endpoint is the target of a
/// plain HTML form.
pub const UPDATE_EXPENSE: &str = "/api/expenses/{expense_id}/edit";
/// The route to delete an expense (POST, see [UPDATE_EXPENSE]).
pub const DELETE_EXPENSE: &str = "/api/expenses/{expense_id}/delete";
/// The route to import expenses from CSV files.
pub const IMPORT_API: &str = "/api/expenses/import";

/// Replace the `{expense_id}` parameter in `endpoint` with a concrete ID.
pub fn format_endpoint(endpoint: &str, expense_id: i64) -> String {
    endpoint.replace("{expense_id}", &expense_id.to_string())
}

#[cfg(test)]
mod endpoint_tests {
    use super::{EDIT_EXPENSE_VIEW, format_endpoint};

    #[test]
    fn format_endpoint_replaces_id_parameter() {
        assert_eq!(
            format_endpoint(EDIT_EXPENSE_VIEW, 42),
            "/expenses/42/edit".to_string()
        );
    }
}
