//! Integration tests for TestHarness.
//!
//! Tests the headless harness API for driving the customizer programmatically.

use std::path::Path;

use case_customizer_lib::fixtures::{self, RecordingConverter};
use case_customizer_lib::harness::TestHarness;
use case_customizer_lib::state::AppSettings;

#[test]
fn test_harness_fixture_model_is_valid() {
    let h = TestHarness::new();
    let errors = h.validate_surfaces();
    assert!(errors.is_empty(), "Validation errors: {:?}", errors);

    let model = h.state().model_view().model().unwrap();
    let names: Vec<&str> = model.surfaces().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["front", "back"]);
}

#[test]
fn test_harness_model_cache_reuses_asset() {
    let mut h = TestHarness::new();
    assert_eq!(h.state().assets().loads(), 1);

    h.state_mut()
        .mount_model_bytes(
            Path::new(fixtures::QUAD_MODEL_KEY),
            fixtures::quad_model_gltf().as_bytes(),
        )
        .unwrap();
    assert_eq!(h.state().assets().loads(), 1);
    assert_eq!(h.state().model_view().load_generation(), 2);
}

#[test]
fn test_harness_remount_keeps_current_texture() {
    let mut h = TestHarness::new();
    h.upload_png("art.png", [9, 9, 9, 255]);
    h.settle();
    let id = h.current_image_id().unwrap();

    h.state_mut()
        .mount_model_bytes(
            Path::new(fixtures::QUAD_MODEL_KEY),
            fixtures::quad_model_gltf().as_bytes(),
        )
        .unwrap();
    h.settle();
    assert_eq!(h.surface_sources(), vec![Some(id), Some(id)]);
}

#[test]
fn test_harness_snapshot_tracks_state() {
    let mut h = TestHarness::new();
    h.rotate_left();
    h.hover_enter();
    h.tick(0.5);

    let snap = h.snapshot();
    assert!(!snap.loading);
    assert!(snap.hovered);
    assert!((snap.angle - (std::f32::consts::PI + 0.2)).abs() < 1e-5);
    assert!((snap.transform.yaw - (snap.angle + 0.08)).abs() < 1e-5);
    assert!(snap.image.is_none());
    assert!(snap.last_error.is_none());
}

#[test]
fn test_harness_custom_splash_delay() {
    let mut settings = AppSettings::default();
    settings.loading.splash_ms = 250;
    settings.model.path = "/no/such/model.glb".into();
    let mut h = TestHarness::at_startup(settings, RecordingConverter::succeeding());

    assert!(!h.advance_clock(std::time::Duration::from_millis(200)));
    assert!(h.advance_clock(std::time::Duration::from_millis(50)));
}

#[test]
fn test_harness_upload_from_disk() {
    let dir = std::env::temp_dir().join(format!("case-customizer-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("disk.png");
    std::fs::write(&path, fixtures::png_bytes(2, 2, [40, 50, 60, 255])).unwrap();

    let mut h = TestHarness::new();
    h.upload_path(&path).unwrap();
    h.settle();

    let image = h.state().current_image().unwrap();
    assert_eq!(image.mime, "image/png");
    assert_eq!(h.snapshot().textured_surfaces, 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_harness_rejects_model_with_bad_indices() {
    let mut h = TestHarness::new();
    let result = h.state_mut().mount_model_bytes(
        Path::new("memory://broken.gltf"),
        fixtures::triangle_gltf(&[0, 1, 7]).as_bytes(),
    );
    assert!(result.is_err());

    let view = h.state().model_view();
    assert!(view.model().is_none());
    assert!(view.load_error().unwrap().contains("out of range"));
}
