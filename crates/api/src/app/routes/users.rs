use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use staffsync_auth::IdentityView;
use staffsync_core::IdentityId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::CallerContext;

/// Routes open to anonymous callers.
pub fn public_router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Routes behind the authentication gate.
pub fn protected_router() -> Router {
    Router::new()
        .route("/", get(list_employees).post(add_employee))
        .route("/profile", put(update_profile))
        .route("/:id", put(update_employee).delete(delete_employee))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    match services.accounts.register(body).await {
        Ok(session) => (
            StatusCode::CREATED,
            Json(dto::SessionResponse::without_role(&session.identity, session.token)),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.accounts.login(body).await {
        Ok(session) => (
            StatusCode::OK,
            Json(dto::SessionResponse::with_role(&session.identity, session.token)),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::UpdateProfileRequest>,
) -> axum::response::Response {
    match services.accounts.update_profile(caller.identity(), body).await {
        Ok(session) => (
            StatusCode::OK,
            Json(dto::SessionResponse::without_role(&session.identity, session.token)),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

pub async fn list_employees(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match services.accounts.list_employees(caller.identity()).await {
        Ok(items) => {
            let items = items.iter().map(IdentityView::from).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::account_error_to_response(e),
    }
}

pub async fn add_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::AddEmployeeRequest>,
) -> axum::response::Response {
    match services.accounts.add_employee(caller.identity(), body).await {
        Ok(employee) => (StatusCode::CREATED, Json(employee.view())).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

pub async fn update_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateEmployeeRequest>,
) -> axum::response::Response {
    let Some(id) = parse_id(&id) else {
        return user_not_found();
    };

    match services.accounts.update_employee(caller.identity(), id, body).await {
        Ok(employee) => (StatusCode::OK, Json(employee.view())).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

pub async fn delete_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Some(id) = parse_id(&id) else {
        return user_not_found();
    };

    match services.accounts.delete_employee(caller.identity(), id).await {
        Ok(id) => (StatusCode::OK, Json(dto::DeletedResponse { id })).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

// A malformed id cannot name a stored user.
fn parse_id(raw: &str) -> Option<IdentityId> {
    raw.parse().ok()
}

fn user_not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found")
}
