//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: account operations and the shared `AppServices`
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use staffsync_auth::{Argon2Hasher, PasswordHasher};
use staffsync_infra::{seed_admin, AppConfig, CredentialStore, InMemoryCredentialStore, PostgresCredentialStore};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Selects the credential store, applies the schema, and seeds the initial
/// admin before any request is served.
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let store: Arc<dyn CredentialStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresCredentialStore::connect(url)
                .await
                .context("failed to connect to the credential database")?;
            tracing::info!("using postgres credential store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory credential store");
            Arc::new(InMemoryCredentialStore::new())
        }
    };

    let hasher: Arc<dyn PasswordHasher> =
        Arc::new(Argon2Hasher::new(&config.auth.hashing).context("invalid password hashing parameters")?);

    let outcome = seed_admin(
        store.as_ref(),
        hasher.as_ref(),
        config.seed_admin.as_ref(),
        config.posture,
    )
    .await
    .context("failed to seed the admin identity")?;
    tracing::info!(?outcome, "bootstrap finished");

    let services = AppServices::new(
        store,
        hasher,
        &config.auth,
        config.default_employee_password.clone(),
    )
    .context("failed to initialise account services")?;

    router(Arc::new(services), &config.cors_origin)
}

/// Assemble routes, the authentication gate, CORS and request tracing.
pub fn router(services: Arc<AppServices>, cors_origin: &str) -> anyhow::Result<Router> {
    let origin = HeaderValue::from_str(cors_origin)
        .with_context(|| format!("invalid CORS origin '{cors_origin}'"))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    // Protected routes: the caller is resolved from the bearer token first.
    let protected = routes::protected_router().route_layer(axum::middleware::from_fn_with_state(
        services.gate.clone(),
        middleware::auth_middleware,
    ));

    Ok(Router::new()
        .route("/", get(routes::system::health))
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors)))
}
