//! # Authentication & Authorization
//!
//! HS256 JWT bearer tokens with a role claim.
//!
//! ## Token Format
//!
//! ```text
//! Authorization: Bearer <jwt>
//! Authorization: <jwt>            — bare token, accepted for older storefronts
//! ```
//!
//! Claims: `{ "sub": <user uuid>, "role": "admin" | "standard", "iat", "exp" }`.
//!
//! ## Flow
//!
//! [`auth_middleware`] runs on every API route. It never rejects by itself:
//! a valid token puts a [`CallerIdentity`] into the request extensions, an
//! invalid one puts an [`InvalidCredentials`] marker, and no header leaves
//! the request anonymous. Handlers opt in by taking [`CallerIdentity`]
//! (401 on failure) or [`AdminIdentity`] (401, then 403). Both are
//! `FromRequestParts` extractors, so they run before any body is read.
//!
//! When the token subject exists in the user store, the stored role wins
//! over the role claim.

use std::fmt;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wheeler_core::Role;
use zeroize::Zeroizing;

use crate::error::AppError;
use crate::state::AppState;

pub const NO_TOKEN_MESSAGE: &str = "No token provided";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";
pub const ADMIN_ONLY_MESSAGE: &str = "Unauthorized access, only admin can access";

// ── Secret ──────────────────────────────────────────────────────────────────

/// Signing secret, zeroed on drop and redacted in `Debug`.
#[derive(Clone)]
pub struct SecretToken(Zeroizing<String>);

impl SecretToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretToken([REDACTED])")
    }
}

// ── Claims & Verifier ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("JWT secret must not be empty")]
    EmptySecret,

    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token rejected: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<Keys>,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithm", &"HS256")
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(secret: &SecretToken) -> Result<Self, AuthError> {
        if secret.as_bytes().is_empty() {
            return Err(AuthError::EmptySecret);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
                validation,
            }),
        })
    }

    /// Sign a token for `subject` valid for `ttl`.
    pub fn issue(&self, subject: Uuid, role: Role, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject,
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(AuthError::Encode)
    }

    /// Check signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.keys.decoding, &self.keys.validation)
            .map(|data| data.claims)
            .map_err(AuthError::Invalid)
    }
}

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Authenticated caller, available to handlers via `FromRequestParts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: Uuid,
    pub role: Role,
}

impl CallerIdentity {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Marker left by the middleware when a token was presented but rejected.
#[derive(Debug, Clone, Copy)]
pub struct InvalidCredentials;

impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<CallerIdentity>() {
            return Ok(*identity);
        }
        if parts.extensions.get::<InvalidCredentials>().is_some() {
            return Err(AppError::Unauthorized(INVALID_TOKEN_MESSAGE.into()));
        }
        Err(AppError::Unauthorized(NO_TOKEN_MESSAGE.into()))
    }
}

/// Returns 403 unless the caller is an admin.
pub fn require_admin(caller: &CallerIdentity) -> Result<(), AppError> {
    if caller.is_admin() {
        Ok(())
    } else {
        tracing::warn!(user_id = %caller.user_id, role = %caller.role, "admin route refused");
        Err(AppError::Forbidden(ADMIN_ONLY_MESSAGE.into()))
    }
}

/// An authenticated caller holding the admin role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminIdentity(pub CallerIdentity);

impl<S: Send + Sync> axum::extract::FromRequestParts<S> for AdminIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = CallerIdentity::from_request_parts(parts, state).await?;
        require_admin(&caller)?;
        Ok(Self(caller))
    }
}

// ── Middleware ──────────────────────────────────────────────────────────────

/// Pull the token out of an `Authorization` value: `Bearer <t>` or bare `<t>`.
pub fn token_from_header(value: &str) -> Option<&str> {
    let value = value.trim();
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}

/// Resolve the caller from the `Authorization` header, if any.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_header)
        .map(str::to_owned);

    if let Some(token) = token {
        match state.tokens.verify(&token) {
            Ok(claims) => {
                let role = state
                    .users
                    .get(&claims.sub)
                    .map(|u| u.role)
                    .unwrap_or(claims.role);
                request.extensions_mut().insert(CallerIdentity {
                    user_id: claims.sub,
                    role,
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "authentication failed");
                request.extensions_mut().insert(InvalidCredentials);
            }
        }
    }

    next.run(request).await
}
