use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod verifier;

// Routing segregation (Public, Authenticated).
pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use auth::AuthGate;
pub use config::{AppConfig, CorsPolicy};
pub use engine::{DesignEngine, EngineState, PlaceholderEngine};
pub use error::{ApiError, AuthError, EngineError};
pub use models::Identity;
pub use verifier::{JwtVerifier, MockVerifier, RemoteVerifier, TokenVerifier};

/// Registers the bearer scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json` with the
/// Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::root, handlers::health, handlers::get_me, handlers::generate_design,
        handlers::refine_sketch, handlers::process_fabric, handlers::convert_to_3d,
        handlers::chat, handlers::upload_file
    ),
    components(
        schemas(
            models::ServiceInfo, models::HealthResponse, models::UserProfileResponse,
            models::GenerateRequest, models::GenerateResponse, models::SketchRequest,
            models::SketchResponse, models::FabricRequest, models::FabricResponse,
            models::ConvertResponse, models::ChatRequest, models::ChatResponse,
            models::UploadForm, models::UploadResponse, models::ErrorBody,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "tryonx", description = "TryOnX fashion design API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Everything a request may need, built once in `main` and cloned per request.
/// All members are immutable.
#[derive(Clone)]
pub struct AppState {
    /// Authentication strategy resolved from the configuration at startup.
    pub gate: AuthGate,
    /// Backend for the design endpoints.
    pub engine: EngineState,
    pub config: AppConfig,
}

impl AppState {
    /// Builds the state from a loaded configuration, picking the auth strategy the
    /// configuration calls for.
    pub fn new(config: AppConfig, engine: EngineState) -> Self {
        Self {
            gate: AuthGate::from_config(&config),
            engine,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AuthGate {
    fn from_ref(app_state: &AppState) -> AuthGate {
        app_state.gate.clone()
    }
}

impl FromRef<AppState> for EngineState {
    fn from_ref(app_state: &AppState) -> EngineState {
        app_state.engine.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards the authenticated routes. Extracting `Identity` runs the auth gate; a
/// rejection short-circuits with 401 (or 500 for provider failures). On success the
/// identity is stored in the request extensions for the handler.
async fn auth_middleware(identity: Identity, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// create_router
///
/// Assembles routes, middleware and state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = cors_layer(&state.config.cors);
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes(state.config.max_upload_bytes))
        // Protected routes: the middleware runs the auth gate before the handler.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, tagged with the request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echoes x-request-id on the response.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer (outermost, so preflights never reach the router)
        .layer(cors)
}

/// cors_layer
///
/// An explicit origin list allows credentials, so methods and headers are mirrored
/// from the preflight rather than wildcarded.
fn cors_layer(policy: &CorsPolicy) -> CorsLayer {
    match policy {
        CorsPolicy::Permissive => CorsLayer::new()
            .allow_methods(Any)
            .allow_origin(Any)
            .allow_headers(Any),
        CorsPolicy::Origins(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(%origin, "ignoring unusable CORS origin");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_credentials(true)
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
        }
    }
}

/// trace_span_logger
///
/// Span for every request, tagged with the `x-request-id` set by `SetRequestIdLayer`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
