use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

// --- Identity ---

/// Identity
///
/// The resolved caller of a protected request. Produced by the auth gate, consumed
/// by the handler and dropped with the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Identity {
    /// Token subject as issued by the identity provider.
    pub uid: String,
    pub email: Option<String>,
    /// Token expiry, when the verifier knows it.
    #[ts(type = "string | null")]
    pub expires_at: Option<DateTime<Utc>>,
}

// --- Request Payloads (Input Schemas) ---

fn default_style() -> String {
    "fashion".to_string()
}

fn default_refine_level() -> String {
    "high".to_string()
}

fn default_garment_type() -> String {
    "top".to_string()
}

// An explicit `null` on an optional field falls back to the field's default, the
// same as leaving the field out.

fn style_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_style))
}

fn refine_level_or_default<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_refine_level))
}

fn garment_type_or_default<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_garment_type))
}

fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// GenerateRequest
///
/// Text prompt for 2D design generation (POST /api/generate).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct GenerateRequest {
    #[schema(example = "red silk dress")]
    pub prompt: String,
    #[serde(default = "default_style", deserialize_with = "style_or_default")]
    pub style: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub negative_prompt: String,
}

/// SketchRequest
///
/// Reference to an uploaded sketch to be refined (POST /api/sketch/refine).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SketchRequest {
    pub image_url: String,
    #[serde(
        default = "default_refine_level",
        deserialize_with = "refine_level_or_default"
    )]
    pub refine_level: String,
}

/// FabricRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FabricRequest {
    pub image_url: String,
    #[serde(
        default = "default_garment_type",
        deserialize_with = "garment_type_or_default"
    )]
    pub garment_type: String,
}

/// ConvertRequest
///
/// Query parameters of POST /api/convert/2d-to-3d. The frontend sends these in the
/// query string rather than a JSON body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
#[ts(export)]
pub struct ConvertRequest {
    /// The 2D design to reconstruct.
    pub image_url: String,
    #[serde(default = "default_garment_type")]
    pub garment_type: String,
}

/// ChatRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ChatRequest {
    pub message: String,
    /// Omitted on the first message of a conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// UploadForm
///
/// OpenAPI description of the multipart body accepted by POST /api/upload.
/// The handler reads the parts directly; this type only exists for the docs.
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// UploadedFile
///
/// The `file` part of a multipart upload after it has been read into memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Sanitized filename, never empty.
    pub filename: String,
    /// Content type declared by the client for this part.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

// --- Response Payloads (Output Schemas) ---

/// ServiceInfo
///
/// Banner returned by GET /.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ServiceInfo {
    pub status: String,
    pub message: String,
    pub version: String,
}

/// HealthResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HealthResponse {
    pub status: String,
}

/// UserProfileResponse
///
/// Output of GET /api/user/me.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserProfileResponse {
    pub status: String,
    pub uid: String,
    pub email: Option<String>,
}

/// GenerateResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct GenerateResponse {
    pub status: String,
    pub image_url: String,
    /// The prompt exactly as received.
    pub prompt: String,
    /// Seconds spent producing the design.
    pub processing_time: f64,
}

/// SketchResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SketchResponse {
    pub status: String,
    pub refined_image_url: String,
    pub detected_components: Vec<String>,
    pub processing_time: f64,
}

/// FabricResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FabricResponse {
    pub status: String,
    pub texture_url: String,
    /// Hex colours, dominant first.
    pub color_palette: Vec<String>,
    pub fabric_type: String,
    pub drape_coefficient: f64,
}

/// ConvertResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ConvertResponse {
    pub status: String,
    pub glb_url: String,
    pub fbx_url: String,
    pub mesh_vertices: u32,
    pub processing_time: f64,
}

/// ChatResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ChatResponse {
    pub status: String,
    pub response: String,
    pub conversation_id: String,
}

/// UploadResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UploadResponse {
    pub status: String,
    pub file_url: String,
    pub file_type: Option<String>,
}

/// ErrorBody
///
/// Shape of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorBody {
    pub status: String,
    pub detail: String,
}
