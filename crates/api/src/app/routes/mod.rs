use axum::Router;

pub mod system;
pub mod users;

/// Routes reachable without a token.
pub fn public_router() -> Router {
    Router::new().nest("/api/users", users::public_router())
}

/// Routes that require a resolved caller.
pub fn protected_router() -> Router {
    Router::new().nest("/api/users", users::protected_router())
}
