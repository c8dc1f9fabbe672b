//! Integration tests for the AgentCommand JSON protocol.
//!
//! Tests the full command pipeline: JSON string -> parse -> execute -> response.

use case_customizer_lib::command::{execute_json, execute_json_batch};
use case_customizer_lib::harness::TestHarness;

#[test]
fn test_command_rotate_reports_angle() {
    let mut h = TestHarness::new();

    let resp = execute_json(&mut h, r#"{"command": "rotate_left"}"#).unwrap();
    assert!(resp.success);
    let angle = resp.data.unwrap()["angle"].as_f64().unwrap() as f32;
    assert!((angle - (std::f32::consts::PI + 0.2)).abs() < 1e-5);
}

#[test]
fn test_command_upload_color_and_inspect() {
    let mut h = TestHarness::new();

    let json = r#"{"command": "upload_color", "name": "red.png", "rgba": [255, 0, 0, 255]}"#;
    let resp = execute_json(&mut h, json).unwrap();
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["seq"], 1);

    let resp = execute_json(&mut h, r#"{"command": "settle"}"#).unwrap();
    assert!(resp.success);

    let resp = execute_json(&mut h, r#"{"command": "inspect"}"#).unwrap();
    assert!(resp.success);
    let data = resp.data.unwrap();
    assert_eq!(data["surface_count"], 2);
    assert_eq!(data["textured_surfaces"], 2);
    assert_eq!(data["image"]["mime"], "image/png");
    assert_eq!(data["image"]["status"], "ready");
}

#[test]
fn test_command_full_workflow_via_json_batch() {
    let mut h = TestHarness::new();

    let json = r#"[
        {"command": "rotate_right"},
        {"command": "pointer_enter"},
        {"command": "upload_heic", "name": "IMG_0042.HEIC"},
        {"command": "settle"},
        {"command": "tick", "seconds": 1.5},
        {"command": "inspect"}
    ]"#;

    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses.len(), 6);
    assert!(responses.iter().all(|r| r.success));

    let data = responses[5].data.as_ref().unwrap();
    assert_eq!(data["hovered"], true);
    assert_eq!(data["image"]["mime"], "image/jpeg");
    let scale = data["transform"]["scale"].as_f64().unwrap();
    assert!((scale - 1.7).abs() < 1e-3, "scale {scale}");
    assert_eq!(h.converter_calls().len(), 1);
}

#[test]
fn test_command_settle_reports_failed_conversion() {
    let mut h = TestHarness::with_failing_converter();

    let json = r#"[
        {"command": "upload_heic", "name": "broken.heic"},
        {"command": "settle"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert!(responses[0].success);
    assert!(!responses[1].success);
    assert!(responses[1]
        .error
        .as_deref()
        .unwrap()
        .contains("HEIC conversion failed"));
}

#[test]
fn test_command_upload_missing_file() {
    let mut h = TestHarness::new();

    let json = r#"[
        {"command": "upload", "path": "/no/such/picture.png"},
        {"command": "settle"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert!(responses[0].success);
    assert!(!responses[1].success);
    assert!(h.current_image_id().is_none());
}

#[test]
fn test_command_invalid_tick() {
    let mut h = TestHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "tick", "seconds": -1.0}"#).unwrap();
    assert!(!resp.success);
}

#[test]
fn test_command_invalid_json_error() {
    let mut h = TestHarness::new();
    let result = execute_json(&mut h, "not valid json");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Invalid command JSON"));

    let result = execute_json(&mut h, r#"{"command": "spin_forever"}"#);
    assert!(result.is_err());
}
