use crate::{AppState, handlers};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a bearer token: service probes and the design
/// tools the frontend calls anonymously.
pub fn public_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // GET /
        // Service banner and version.
        .route("/", get(handlers::root))
        // GET /health
        // Liveness probe for load balancers. Never touches the auth gate.
        .route("/health", get(handlers::health))
        // POST /api/sketch/refine
        .route("/api/sketch/refine", post(handlers::refine_sketch))
        // POST /api/fabric/process
        .route("/api/fabric/process", post(handlers::process_fabric))
        // POST /api/convert/2d-to-3d?image_url=...&garment_type=...
        .route("/api/convert/2d-to-3d", post(handlers::convert_to_3d))
        // POST /api/chat
        .route("/api/chat", post(handlers::chat))
        // POST /api/upload
        // Multipart upload; the body limit replaces axum's 2 MB default.
        .route(
            "/api/upload",
            post(handlers::upload_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}
