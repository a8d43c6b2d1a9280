//! Application router configuration with protected and unprotected route
//! definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    auth::auth_guard,
    csv_import::{get_import_page, post_import_expenses},
    dashboard::get_dashboard_page,
    endpoints,
    expense::{
        get_edit_expense_page, get_expenses_page, get_new_expense_page, post_create_expense,
        post_delete_expense, post_update_expense,
    },
    html::render_error_page,
    log_in::{get_log_in_page, post_log_in},
    log_out::post_log_out,
    logging::logging_middleware,
    register_user::{get_register_page, post_register_user},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS_API, post(post_register_user))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out));

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_new_expense_page))
        .route(endpoints::EDIT_EXPENSE_VIEW, get(get_edit_expense_page))
        .route(endpoints::EXPENSES_API, post(post_create_expense))
        .route(endpoints::UPDATE_EXPENSE, post(post_update_expense))
        .route(endpoints::DELETE_EXPENSE, post(post_delete_expense))
        .route(endpoints::IMPORT_VIEW, get(get_import_page))
        .route(endpoints::IMPORT_API, post(post_import_expenses))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

async fn get_404_not_found() -> axum::response::Response {
    render_error_page(
        axum::http::StatusCode::NOT_FOUND,
        "Not Found",
        "The page you were looking for does not exist.",
    )
}
