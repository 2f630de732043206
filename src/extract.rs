use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query},
};

use crate::error::ApiError;

/// ApiJson
///
/// `Json` body extractor whose rejection renders as the JSON error body instead of
/// axum's plain-text message.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// ApiQuery
///
/// `Query` extractor with the same error rendering as `ApiJson`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
