use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use staffsync_core::IdentityId;

/// Tolerated clock skew for `iat` claims that appear slightly in the future.
const IAT_LEEWAY_SECS: i64 = 60;

/// JWT claims model.
///
/// Subject id plus the validity window. Role and organization are never
/// carried in the token; they are re-read from the store on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject / identity identifier.
    pub sub: IdentityId,

    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,

    /// Expiration (Unix timestamp, seconds).
    pub exp: i64,

    /// Unique token id.
    pub jti: Uuid,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the claim time window.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::TokenService`] before this is called.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now + IAT_LEEWAY_SECS < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(iat: DateTime<Utc>, exp: DateTime<Utc>) -> TokenClaims {
        TokenClaims {
            sub: IdentityId::new(),
            iat: iat.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::now_v7(),
        }
    }

    #[test]
    fn accepts_token_inside_window() {
        let now = Utc::now();
        let c = claims(now - Duration::days(1), now + Duration::days(29));
        assert_eq!(validate_claims(&c, now), Ok(()));
    }

    #[test]
    fn expiry_is_exclusive() {
        let now = Utc::now();
        let c = claims(now - Duration::days(30), now);
        assert_eq!(validate_claims(&c, now), Err(TokenValidationError::Expired));
    }

    #[test]
    fn small_clock_skew_is_tolerated() {
        let now = Utc::now();
        let c = claims(now + Duration::seconds(30), now + Duration::days(30));
        assert_eq!(validate_claims(&c, now), Ok(()));

        let c = claims(now + Duration::minutes(5), now + Duration::days(30));
        assert_eq!(validate_claims(&c, now), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let c = claims(now, now - Duration::seconds(1));
        assert_eq!(validate_claims(&c, now), Err(TokenValidationError::InvalidTimeWindow));
    }
}
