use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::EngineError,
    models::{
        ChatRequest, ChatResponse, ConvertRequest, ConvertResponse, FabricRequest, FabricResponse,
        GenerateRequest, GenerateResponse, SketchRequest, SketchResponse, UploadResponse,
        UploadedFile,
    },
};

// 1. DesignEngine Contract
/// DesignEngine
///
/// One operation per design endpoint. Handlers only see this trait, so a real
/// generation, detection or reconstruction backend replaces the placeholder
/// without touching request or response shapes.
#[async_trait]
pub trait DesignEngine: Send + Sync {
    /// Text prompt to 2D design.
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, EngineError>;

    /// Detects garment components on a sketch and returns a refined rendering.
    async fn refine_sketch(&self, req: &SketchRequest) -> Result<SketchResponse, EngineError>;

    /// Extracts texture, palette and drape from a cloth photo.
    async fn process_fabric(&self, req: &FabricRequest) -> Result<FabricResponse, EngineError>;

    /// Reconstructs a 3D garment mesh from a 2D design.
    async fn convert_to_3d(&self, req: &ConvertRequest) -> Result<ConvertResponse, EngineError>;

    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse, EngineError>;

    /// Accepts an uploaded image and returns where it can be referenced from.
    async fn upload(&self, file: &UploadedFile) -> Result<UploadResponse, EngineError>;
}

/// EngineState
///
/// The concrete type used to share the engine across the application state.
pub type EngineState = Arc<dyn DesignEngine>;

// 2. Placeholder Implementation
/// PlaceholderEngine
///
/// Returns fixed payloads for every operation. Only the prompt, the conversation
/// id and the upload's filename and content type come from the request.
#[derive(Clone, Default)]
pub struct PlaceholderEngine;

const UPLOAD_BASE_URL: &str = "https://example.com/uploads";
const CHAT_REPLY: &str = "That's a great question! Based on your description, I'd recommend considering the fabric weight and drape.";

impl PlaceholderEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DesignEngine for PlaceholderEngine {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, EngineError> {
        Ok(GenerateResponse {
            status: "success".to_string(),
            image_url: "https://via.placeholder.com/512x512/6366f1/ffffff?text=Generated+Design"
                .to_string(),
            prompt: req.prompt.clone(),
            processing_time: 2.5,
        })
    }

    async fn refine_sketch(&self, _req: &SketchRequest) -> Result<SketchResponse, EngineError> {
        Ok(SketchResponse {
            status: "success".to_string(),
            refined_image_url:
                "https://via.placeholder.com/512x512/8b5cf6/ffffff?text=Refined+Design".to_string(),
            detected_components: ["sleeve", "collar", "hem"]
                .into_iter()
                .map(String::from)
                .collect(),
            processing_time: 3.2,
        })
    }

    async fn process_fabric(&self, _req: &FabricRequest) -> Result<FabricResponse, EngineError> {
        Ok(FabricResponse {
            status: "success".to_string(),
            texture_url: "https://via.placeholder.com/256x256".to_string(),
            color_palette: ["#a78bfa", "#818cf8", "#c084fc"]
                .into_iter()
                .map(String::from)
                .collect(),
            fabric_type: "silk".to_string(),
            drape_coefficient: 0.75,
        })
    }

    async fn convert_to_3d(&self, _req: &ConvertRequest) -> Result<ConvertResponse, EngineError> {
        Ok(ConvertResponse {
            status: "success".to_string(),
            glb_url: "https://example.com/model.glb".to_string(),
            fbx_url: "https://example.com/model.fbx".to_string(),
            mesh_vertices: 5000,
            processing_time: 15.3,
        })
    }

    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse, EngineError> {
        // An empty id counts as a new conversation.
        let conversation_id = req
            .conversation_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(ChatResponse {
            status: "success".to_string(),
            response: CHAT_REPLY.to_string(),
            conversation_id,
        })
    }

    async fn upload(&self, file: &UploadedFile) -> Result<UploadResponse, EngineError> {
        // Nothing is stored; the reference only names the file.
        Ok(UploadResponse {
            status: "success".to_string(),
            file_url: format!("{}/{}", UPLOAD_BASE_URL, file.filename),
            file_type: file.content_type.clone(),
        })
    }
}

/// sanitize_filename
///
/// Reduces a client-supplied filename to its last path segment, dropping `.` and
/// `..` components and backslash-separated directories. Returns `None` when
/// nothing usable is left.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    raw.split(['/', '\\'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .last()
        .map(str::to_string)
}
