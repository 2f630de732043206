use std::{env, net::SocketAddr};

use thiserror::Error;

/// Default origins of the Vite and CRA dev servers used by the frontend.
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// never mutated afterwards; handlers and the auth gate pull it out of the shared
/// state through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Production refuses to run without credentials.
    pub env: Env,
    // Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    // Identity-provider credential bundle. `None` means the gate runs in open mode.
    pub identity_provider: Option<IdentityProviderConfig>,
    // Cross-origin policy for browser clients.
    pub cors: CorsPolicy,
    // Upper bound for multipart uploads, in bytes.
    pub max_upload_bytes: usize,
}

/// Env
///
/// Runtime context. `Local` tolerates a missing identity provider (open mode),
/// `Production` does not.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// IdentityProviderConfig
///
/// The credential bundle used to verify bearer tokens. Which variant is present
/// decides the verification strategy the auth gate is built with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityProviderConfig {
    /// Tokens are HS256 JWTs signed with the provider's shared secret.
    Jwt {
        secret: String,
        issuer: Option<String>,
        audience: Option<String>,
    },
    /// Tokens are checked by calling the provider's user endpoint.
    Remote { base_url: String, api_key: String },
}

/// CorsPolicy
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Any origin, method and header; credentials are not allowed.
    Permissive,
    /// Only the listed origins; credentials allowed.
    Origins(Vec<String>),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no identity provider credentials configured; set AUTH_JWT_SECRET or AUTH_PROVIDER_URL and AUTH_PROVIDER_API_KEY")]
    MissingCredentials,

    #[error("{var} is set but {missing} is not")]
    IncompleteCredentials {
        var: &'static str,
        missing: &'static str,
    },

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl Default for AppConfig {
    /// Open-mode local configuration for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            identity_provider: None,
            cors: CorsPolicy::Origins(
                DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            ),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables. Callers are expected to
    /// have loaded `.env` beforehand.
    ///
    /// # Errors
    /// Fails fast when production has no identity provider configured, when only
    /// half of the remote provider credentials are present, or when a numeric or
    /// address variable cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let identity_provider = load_identity_provider()?;
        if env == Env::Production && identity_provider.is_none() {
            return Err(ConfigError::MissingCredentials);
        }

        let bind_addr = non_empty("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let max_upload_bytes = match non_empty("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse::<usize>().map_err(|e| ConfigError::Invalid {
                var: "MAX_UPLOAD_BYTES",
                reason: e.to_string(),
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let cors = match non_empty("CORS_ALLOWED_ORIGINS") {
            Some(raw) => parse_cors_policy(&raw),
            None => CorsPolicy::Origins(
                DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            ),
        };

        Ok(Self {
            env,
            bind_addr,
            identity_provider,
            cors,
            max_upload_bytes,
        })
    }

    /// True when no credential bundle is configured and every caller gets the
    /// development identity.
    pub fn is_open_mode(&self) -> bool {
        self.identity_provider.is_none()
    }
}

fn load_identity_provider() -> Result<Option<IdentityProviderConfig>, ConfigError> {
    // A JWT secret takes precedence over remote credentials.
    if let Some(secret) = non_empty("AUTH_JWT_SECRET") {
        return Ok(Some(IdentityProviderConfig::Jwt {
            secret,
            issuer: non_empty("AUTH_JWT_ISSUER"),
            audience: non_empty("AUTH_JWT_AUDIENCE"),
        }));
    }

    match (non_empty("AUTH_PROVIDER_URL"), non_empty("AUTH_PROVIDER_API_KEY")) {
        (Some(base_url), Some(api_key)) => {
            Ok(Some(IdentityProviderConfig::Remote { base_url, api_key }))
        }
        (Some(_), None) => Err(ConfigError::IncompleteCredentials {
            var: "AUTH_PROVIDER_URL",
            missing: "AUTH_PROVIDER_API_KEY",
        }),
        (None, Some(_)) => Err(ConfigError::IncompleteCredentials {
            var: "AUTH_PROVIDER_API_KEY",
            missing: "AUTH_PROVIDER_URL",
        }),
        (None, None) => Ok(None),
    }
}

/// parse_cors_policy
///
/// `*` anywhere in the list switches to the permissive policy. Blank entries are
/// dropped and trailing slashes trimmed so `http://a.test/` matches the browser's
/// `Origin` header.
pub fn parse_cors_policy(raw: &str) -> CorsPolicy {
    let origins: Vec<String> = raw
        .split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|o| o == "*") {
        CorsPolicy::Permissive
    } else {
        CorsPolicy::Origins(origins)
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

