use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::DateTime;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::AuthError, models::Identity};

/// TokenVerifier
///
/// Contract with the external identity provider: hand over the raw bearer token,
/// get back the caller's identity or a classified rejection. Implementations keep
/// no per-request state and never cache verdicts.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// VerifierState
///
/// The shared handle stored inside the auth gate.
pub type VerifierState = Arc<dyn TokenVerifier>;

/// Claims
///
/// Payload expected inside a provider-issued JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the provider's user id.
    pub sub: String,
    /// Expiration Time (exp). Always validated.
    pub exp: usize,
    /// Issued At (iat).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// --- JWT (shared secret) ---

/// JwtVerifier
///
/// Verifies HS256 tokens locally with the provider's signing secret.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str, issuer: Option<&str>, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            // Provider tokens usually carry an `aud`; without a configured value there
            // is nothing to compare it to.
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify_jwt_error(e.kind()))?;

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(Identity {
            uid: claims.sub,
            email: claims.email,
            expires_at: i64::try_from(claims.exp)
                .ok()
                .and_then(|exp| DateTime::from_timestamp(exp, 0)),
        })
    }
}

/// Sorts `jsonwebtoken` failures into the gate's three rejection kinds.
fn classify_jwt_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::ImmatureSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => AuthError::InvalidToken,
        other => AuthError::Verification(format!("{other:?}")),
    }
}

// --- Remote user endpoint ---

/// ProviderUser
///
/// Minimal body of the provider's `/auth/v1/user` response.
#[derive(Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// RemoteVerifier
///
/// Asks the identity provider who the token belongs to. Used when the provider's
/// signing secret is not available to this service, only its public API key.
pub struct RemoteVerifier {
    client: reqwest::Client,
    user_url: String,
    api_key: String,
}

impl RemoteVerifier {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            user_url: format!("{}/auth/v1/user", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl TokenVerifier for RemoteVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let response = self
            .client
            .get(&self.user_url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Verification(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let user = response
                .json::<ProviderUser>()
                .await
                .map_err(|e| AuthError::Verification(e.to_string()))?;
            return Ok(Identity {
                uid: user.id,
                email: user.email,
                expires_at: None,
            });
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_else(|e| {
                    tracing::debug!(error = %e, "could not read identity provider rejection body");
                    String::new()
                });
                if body.to_ascii_lowercase().contains("expired") {
                    Err(AuthError::ExpiredToken)
                } else {
                    Err(AuthError::InvalidToken)
                }
            }
            other => Err(AuthError::Verification(format!(
                "identity provider responded with {other}"
            ))),
        }
    }
}

// --- Mock (tests) ---

/// MockVerifier
///
/// Returns a canned verdict for every token. Lets tests drive the gate without an
/// identity provider.
#[derive(Clone)]
pub struct MockVerifier {
    outcome: Result<Identity, AuthError>,
}

impl MockVerifier {
    pub fn granting(identity: Identity) -> Self {
        Self {
            outcome: Ok(identity),
        }
    }

    pub fn rejecting(error: AuthError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

#[async_trait]
impl TokenVerifier for MockVerifier {
    async fn verify(&self, _token: &str) -> Result<Identity, AuthError> {
        self.outcome.clone()
    }
}
