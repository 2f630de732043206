use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Routes that require a caller identity. The router returned here is wrapped in
/// the auth middleware by `create_router`; handlers take `Identity` as an argument
/// and get the value the middleware already resolved.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/user/me
        // The identity resolved for the current token.
        .route("/api/user/me", get(handlers::get_me))
        // POST /api/generate
        // Text prompt to 2D design.
        .route("/api/generate", post(handlers::generate_design))
}
