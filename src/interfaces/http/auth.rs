//! Bearer-token authentication.
//!
//! Tokens have the form `<user id>.<role>.<expires at>.<hex hmac>` where the
//! expiry is a unix timestamp in seconds and the HMAC-SHA256 covers
//! everything before the last dot under the server's auth secret. The
//! `AuthUser` extractor accepts the token from the `Authorization: Bearer`
//! header or a `token` cookie.

use crate::application::signature::{constant_time_eq, hmac_sha256_hex};
use crate::config::{Config, Secret};
use crate::domain::user::{AccountType, UserId};
use crate::error::CoursePayError;
use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use chrono::Utc;
use std::sync::Arc;

pub struct TokenAuthority {
    secret: Secret,
    ttl_secs: i64,
}

impl TokenAuthority {
    pub fn new(secret: Secret) -> Self {
        Self {
            secret,
            ttl_secs: Config::DEFAULT_TOKEN_TTL_SECS,
        }
    }

    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn issue(&self, user: &UserId, role: AccountType) -> String {
        self.issue_at(user, role, Utc::now().timestamp())
    }

    /// Issues a token as if the current time were `issued_at`.
    pub fn issue_at(&self, user: &UserId, role: AccountType, issued_at: i64) -> String {
        let expires_at = issued_at.saturating_add(self.ttl_secs);
        let claims = format!("{user}.{role}.{expires_at}");
        let signature = hmac_sha256_hex(&self.secret, claims.as_bytes());
        format!("{claims}.{signature}")
    }

    pub fn authenticate(&self, token: &str) -> Result<AuthUser, CoursePayError> {
        self.authenticate_at(token, Utc::now().timestamp())
    }

    /// Validates `token` against the clock value `now`.
    pub fn authenticate_at(&self, token: &str, now: i64) -> Result<AuthUser, CoursePayError> {
        let invalid = || CoursePayError::Unauthorized("Token is invalid or has expired".to_string());

        let (claims, signature) = token.rsplit_once('.').ok_or_else(invalid)?;
        let expected = hmac_sha256_hex(&self.secret, claims.as_bytes());
        if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
            return Err(invalid());
        }

        let (subject, expires_at) = claims.rsplit_once('.').ok_or_else(invalid)?;
        let expires_at: i64 = expires_at.parse().map_err(|_| invalid())?;
        if now >= expires_at {
            return Err(invalid());
        }

        let (user, role) = subject.rsplit_once('.').ok_or_else(invalid)?;
        if user.is_empty() {
            return Err(invalid());
        }
        let role = role.parse::<AccountType>().map_err(|_| invalid())?;

        Ok(AuthUser {
            id: UserId::new(user),
            role,
        })
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: UserId,
    pub role: AccountType,
}

impl AuthUser {
    pub fn require(&self, role: AccountType) -> Result<(), CoursePayError> {
        if self.role == role {
            Ok(())
        } else {
            Err(CoursePayError::Forbidden(format!(
                "This route is accessible to {} accounts only",
                role.as_str().to_lowercase()
            )))
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    if let Some(value) = parts.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
        && let Some(token) = value.strip_prefix("Bearer ")
    {
        return Some(token.trim());
    }

    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| pair.trim().strip_prefix("token="))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<TokenAuthority>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = CoursePayError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authority = Arc::<TokenAuthority>::from_ref(state);
        let token = bearer_token(parts)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CoursePayError::Unauthorized("Authentication token is missing".to_string()))?;
        authority.authenticate(token)
    }
}
