use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use std::sync::Arc;

use crate::{
    config::{AppConfig, IdentityProviderConfig},
    error::{ApiError, AuthError},
    models::Identity,
    verifier::{JwtVerifier, RemoteVerifier, VerifierState},
};

/// Subject granted to every caller while the gate is open.
pub const DEV_IDENTITY_UID: &str = "dev_user";
pub const DEV_IDENTITY_EMAIL: &str = "dev@tryonx.local";

/// AuthGate
///
/// The authentication strategy, chosen once at startup from the configuration and
/// shared read-only by every request.
///
/// - `Open`: no identity-provider credentials were configured. Every request is
///   granted the development identity, whatever token it carries. This is a
///   development bypass only; `AppConfig::load` refuses production without
///   credentials.
/// - `Verifying`: the bearer token is required and handed to the verifier.
#[derive(Clone)]
pub enum AuthGate {
    Open,
    Verifying(VerifierState),
}

impl AuthGate {
    /// from_config
    ///
    /// Resolves the strategy from the loaded credential bundle.
    pub fn from_config(config: &AppConfig) -> Self {
        match &config.identity_provider {
            None => AuthGate::Open,
            Some(IdentityProviderConfig::Jwt {
                secret,
                issuer,
                audience,
            }) => AuthGate::Verifying(Arc::new(JwtVerifier::new(
                secret,
                issuer.as_deref(),
                audience.as_deref(),
            ))),
            Some(IdentityProviderConfig::Remote { base_url, api_key }) => {
                AuthGate::Verifying(Arc::new(RemoteVerifier::new(base_url, api_key)))
            }
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, AuthGate::Open)
    }

    /// authenticate
    ///
    /// One verification per call: no retries and nothing remembered between calls.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        match self {
            AuthGate::Open => Ok(dev_identity()),
            AuthGate::Verifying(verifier) => {
                let token = token.ok_or(AuthError::MissingToken)?;
                verifier.verify(token).await
            }
        }
    }
}

/// The fixed identity handed out in open mode.
pub fn dev_identity() -> Identity {
    Identity {
        uid: DEV_IDENTITY_UID.to_string(),
        email: Some(DEV_IDENTITY_EMAIL.to_string()),
        expires_at: None,
    }
}

/// bearer_token
///
/// Pulls the token out of `Authorization: Bearer <token>`. The scheme is matched
/// case-insensitively; a missing header, another scheme or an empty token all
/// yield `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Identity Extractor Implementation
///
/// Makes `Identity` usable as a handler argument on protected routes. The auth
/// middleware runs the gate first and leaves the result in the request
/// extensions; the extractor reuses it so the provider is consulted once per
/// request. When used outside the middleware it runs the gate itself.
///
/// The entire process involves:
/// 1. Reuse: an identity already resolved by the auth middleware.
/// 2. Dependency Resolution: the auth gate from the application state.
/// 3. Token Extraction: the bearer token, if any.
/// 4. Verification: open mode or the configured verifier.
///
/// Rejection: 401 for missing/invalid/expired tokens, 500 when the provider
/// cannot give a verdict.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    AuthGate: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Identity Already Resolved by the Middleware
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(identity.clone());
        }

        // 2. Dependency Resolution
        let gate = AuthGate::from_ref(state);

        // 3. Token Extraction
        // A missing token is not an error yet: open mode ignores it.
        let token = bearer_token(&parts.headers);

        // 4. Verification
        // Verifier failures that are not the caller's fault are logged louder.
        match gate.authenticate(token).await {
            Ok(identity) => {
                tracing::debug!(uid = %identity.uid, "request authenticated");
                Ok(identity)
            }
            Err(AuthError::Verification(reason)) => {
                tracing::warn!(%reason, "identity provider could not verify token");
                Err(AuthError::Verification(reason).into())
            }
            Err(e) => {
                tracing::debug!(error = %e, "request rejected by auth gate");
                Err(e.into())
            }
        }
    }
}
