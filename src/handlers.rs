use crate::{
    AppState,
    engine::sanitize_filename,
    error::{ApiError, EngineError},
    extract::{ApiJson, ApiQuery},
    models::{
        ChatRequest, ChatResponse, ConvertRequest, ConvertResponse, ErrorBody, FabricRequest,
        FabricResponse, GenerateRequest, GenerateResponse, HealthResponse, Identity, ServiceInfo,
        SketchRequest, SketchResponse, UploadForm, UploadResponse, UploadedFile,
        UserProfileResponse,
    },
};
use axum::{
    Json,
    extract::{Multipart, State},
};

const SERVICE_BANNER: &str = "TryOnX API is running";

/// Logs an engine failure and turns it into the 500 response the caller sees.
fn engine_failure(operation: &'static str) -> impl FnOnce(EngineError) -> ApiError {
    move |err| {
        tracing::error!(operation, error = %err, "design engine failed");
        ApiError::from(err)
    }
}

// --- Service Endpoints ---

/// root
///
/// [Public Route] Service banner and version.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Banner", body = ServiceInfo))
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "running".to_string(),
        message: SERVICE_BANNER.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// health
///
/// [Public Route] Liveness probe. Independent of the auth configuration.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Alive", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

// --- Authenticated Endpoints ---

/// get_me
///
/// [Authenticated Route] Echoes the identity the auth gate resolved for this request.
#[utoipa::path(
    get,
    path = "/api/user/me",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserProfileResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody)
    )
)]
pub async fn get_me(identity: Identity) -> Json<UserProfileResponse> {
    Json(UserProfileResponse {
        status: "success".to_string(),
        uid: identity.uid,
        email: identity.email,
    })
}

/// generate_design
///
/// [Authenticated Route] Text prompt to 2D fashion design. The prompt is returned
/// unchanged; style and negative prompt only steer the engine.
#[utoipa::path(
    post,
    path = "/api/generate",
    security(("bearer_auth" = [])),
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated design", body = GenerateResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 422, description = "Missing or mistyped field", body = ErrorBody),
        (status = 500, description = "Generation failed", body = ErrorBody)
    )
)]
pub async fn generate_design(
    identity: Identity,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    tracing::info!(uid = %identity.uid, style = %payload.style, "generating design");
    let response = state
        .engine
        .generate(&payload)
        .await
        .map_err(engine_failure("generate"))?;
    Ok(Json(response))
}

// --- Public Design Endpoints ---

/// refine_sketch
///
/// [Public Route] Component detection and refinement of an uploaded sketch.
#[utoipa::path(
    post,
    path = "/api/sketch/refine",
    request_body = SketchRequest,
    responses(
        (status = 200, description = "Refined sketch", body = SketchResponse),
        (status = 500, description = "Refinement failed", body = ErrorBody)
    )
)]
pub async fn refine_sketch(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SketchRequest>,
) -> Result<Json<SketchResponse>, ApiError> {
    let response = state
        .engine
        .refine_sketch(&payload)
        .await
        .map_err(engine_failure("refine_sketch"))?;
    Ok(Json(response))
}

/// process_fabric
///
/// [Public Route] Texture, colour palette and drape analysis of a cloth photo.
#[utoipa::path(
    post,
    path = "/api/fabric/process",
    request_body = FabricRequest,
    responses(
        (status = 200, description = "Fabric analysis", body = FabricResponse),
        (status = 500, description = "Analysis failed", body = ErrorBody)
    )
)]
pub async fn process_fabric(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<FabricRequest>,
) -> Result<Json<FabricResponse>, ApiError> {
    let response = state
        .engine
        .process_fabric(&payload)
        .await
        .map_err(engine_failure("process_fabric"))?;
    Ok(Json(response))
}

/// convert_to_3d
///
/// [Public Route] 2D design to 3D garment mesh. Inputs come from the query string.
#[utoipa::path(
    post,
    path = "/api/convert/2d-to-3d",
    params(ConvertRequest),
    responses(
        (status = 200, description = "Mesh references", body = ConvertResponse),
        (status = 400, description = "Missing or malformed query parameter", body = ErrorBody),
        (status = 500, description = "Conversion failed", body = ErrorBody)
    )
)]
pub async fn convert_to_3d(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ConvertRequest>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let response = state
        .engine
        .convert_to_3d(&params)
        .await
        .map_err(engine_failure("convert_to_3d"))?;
    Ok(Json(response))
}

/// chat
///
/// [Public Route] Fashion assistant. A missing conversation id starts a new one.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 500, description = "Assistant failed", body = ErrorBody)
    )
)]
pub async fn chat(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = state
        .engine
        .chat(&payload)
        .await
        .map_err(engine_failure("chat"))?;
    Ok(Json(response))
}

/// upload_file
///
/// [Public Route] Accepts a sketch or fabric photo as the multipart field `file`.
/// Other fields are ignored.
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File reference", body = UploadResponse),
        (status = 400, description = "File has no usable name", body = ErrorBody),
        (status = 413, description = "File too large"),
        (status = 422, description = "No file part", body = ErrorBody)
    )
)]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let file = read_file_part(&mut multipart).await?;
    tracing::info!(
        filename = %file.filename,
        content_type = file.content_type.as_deref().unwrap_or("unknown"),
        size = file.bytes.len(),
        "file uploaded"
    );

    let response = state
        .engine
        .upload(&file)
        .await
        .map_err(engine_failure("upload"))?;
    Ok(Json(response))
}

/// read_file_part
///
/// Scans the multipart stream for the `file` field and reads it into memory.
async fn read_file_part(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let raw_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        let filename = raw_name
            .as_deref()
            .and_then(sanitize_filename)
            .ok_or_else(|| ApiError::BadRequest("Uploaded file has no filename".to_string()))?;

        return Ok(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }

    Err(ApiError::Validation("Field required: file".to_string()))
}
