use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use thiserror::Error;

use staffsync_auth::{Identity, TokenService};
use staffsync_infra::{CredentialStore, StoreError};

use crate::app::errors::json_error;
use crate::context::CallerContext;

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("not authorized, no token")]
    MissingToken,

    #[error("not authorized, token failed")]
    InvalidToken,

    #[error("not authorized, token expired")]
    ExpiredToken,

    #[error("not authorized, user no longer exists")]
    UnknownSubject,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves an `Authorization` header into the live identity it names.
#[derive(Clone)]
pub struct AuthGate {
    store: Arc<dyn CredentialStore>,
    tokens: TokenService,
}

impl AuthGate {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    pub async fn resolve(&self, authorization: Option<&str>) -> Result<Identity, AuthenticationError> {
        self.resolve_at(authorization, Utc::now()).await
    }

    pub async fn resolve_at(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Identity, AuthenticationError> {
        let token = extract_bearer(authorization)?;

        let subject = self.tokens.verify_at(token, now).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            if e.is_expired() {
                AuthenticationError::ExpiredToken
            } else {
                AuthenticationError::InvalidToken
            }
        })?;

        self.store
            .find_by_id(subject)
            .await?
            .ok_or(AuthenticationError::UnknownSubject)
    }
}

pub async fn auth_middleware(
    State(gate): State<AuthGate>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    // A non-UTF-8 header is treated the same as a missing one.
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    match gate.resolve(header.as_deref()).await {
        Ok(identity) => {
            req.extensions_mut().insert(CallerContext::new(identity));
            next.run(req).await
        }
        Err(AuthenticationError::Store(e)) => {
            tracing::error!(error = %e, "credential store failed during authentication");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
        }
        Err(e) => json_error(StatusCode::UNAUTHORIZED, "unauthenticated", e.to_string()),
    }
}

fn extract_bearer(header: Option<&str>) -> Result<&str, AuthenticationError> {
    let header = header.ok_or(AuthenticationError::MissingToken)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(AuthenticationError::MissingToken)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(AuthenticationError::MissingToken);
    }

    Ok(token)
}
