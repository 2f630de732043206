use tryonx_api::{
    engine::sanitize_filename,
    models::{ChatRequest, ConvertRequest, FabricRequest, GenerateRequest, SketchRequest},
};

#[test]
fn test_generate_request_defaults() {
    let req: GenerateRequest = serde_json::from_str(r#"{"prompt":"red silk dress"}"#).unwrap();

    assert_eq!(req.prompt, "red silk dress");
    assert_eq!(req.style, "fashion");
    assert_eq!(req.negative_prompt, "");
}

#[test]
fn test_generate_request_requires_prompt() {
    let result = serde_json::from_str::<GenerateRequest>(r#"{"style":"fashion"}"#);
    assert!(result.is_err());
}

#[test]
fn test_sketch_and_fabric_defaults() {
    let sketch: SketchRequest = serde_json::from_str(r#"{"image_url":"s.png"}"#).unwrap();
    assert_eq!(sketch.refine_level, "high");

    let fabric: FabricRequest = serde_json::from_str(r#"{"image_url":"f.png"}"#).unwrap();
    assert_eq!(fabric.garment_type, "top");

    let convert: ConvertRequest = serde_json::from_str(r#"{"image_url":"d.png"}"#).unwrap();
    assert_eq!(convert.garment_type, "top");
}

#[test]
fn test_explicit_null_uses_field_defaults() {
    let req: GenerateRequest = serde_json::from_str(
        r#"{"prompt":"red silk dress","style":null,"negative_prompt":null}"#,
    )
    .unwrap();
    assert_eq!(req.prompt, "red silk dress");
    assert_eq!(req.style, "fashion");
    assert_eq!(req.negative_prompt, "");

    let sketch: SketchRequest =
        serde_json::from_str(r#"{"image_url":"s.png","refine_level":null}"#).unwrap();
    assert_eq!(sketch.refine_level, "high");

    let fabric: FabricRequest =
        serde_json::from_str(r#"{"image_url":"f.png","garment_type":null}"#).unwrap();
    assert_eq!(fabric.garment_type, "top");

    // Explicit values are still kept.
    let req: GenerateRequest =
        serde_json::from_str(r#"{"prompt":"coat","style":"streetwear"}"#).unwrap();
    assert_eq!(req.style, "streetwear");
}

#[test]
fn test_chat_request_optional_conversation() {
    let req: ChatRequest = serde_json::from_str(r#"{"message":"hello"}"#).unwrap();
    assert!(req.conversation_id.is_none());

    // None is left out when the client type is serialized.
    let json_output = serde_json::to_string(&req).unwrap();
    assert!(!json_output.contains("conversation_id"));
}

#[test]
fn test_sanitize_filename() {
    assert_eq!(sanitize_filename("swatch.png").as_deref(), Some("swatch.png"));
    assert_eq!(
        sanitize_filename("../../etc/passwd").as_deref(),
        Some("passwd")
    );
    assert_eq!(
        sanitize_filename(r"C:\Users\ana\Desktop\sketch.jpg").as_deref(),
        Some("sketch.jpg")
    );
    assert_eq!(sanitize_filename("photos/./..").as_deref(), Some("photos"));
    assert_eq!(sanitize_filename("../.."), None);
    assert_eq!(sanitize_filename(""), None);
}
