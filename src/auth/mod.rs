//! User registration, credential verification and the cookie-based session
//! context that carries the authenticated identity between requests.

mod cookie;
mod core;
mod middleware;

pub use cookie::{
    AuthContext, DEFAULT_SESSION_DURATION, get_auth_context, invalidate_auth_cookie,
    set_auth_cookie,
};
pub use self::core::{register_user, verify_credentials};
pub use middleware::auth_guard;
