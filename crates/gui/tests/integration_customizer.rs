//! End-to-end behaviour of the customizer through the headless harness.
//!
//! Covers rotation, upload normalization, texture binding, hover scaling
//! and the startup splash gate.

use std::f32::consts::PI;
use std::time::Duration;

use case_customizer_lib::fixtures::{self, RecordingConverter};
use case_customizer_lib::harness::TestHarness;
use case_customizer_lib::interaction::Action;
use case_customizer_lib::normalize::{decode_data_url, ConversionRequest, TargetFormat};
use case_customizer_lib::state::AppSettings;
use shared::DecodeStatus;

const FRAME: f32 = 1.0 / 60.0;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

// ── Rotation ──────────────────────────────────────────────────

#[test]
fn test_rotation_starts_at_pi() {
    let h = TestHarness::new();
    assert!(approx(h.angle(), PI));
}

#[test]
fn test_rotation_sequence_accumulates() {
    let mut h = TestHarness::new();
    let actions = [
        Action::RotateLeft,
        Action::RotateLeft,
        Action::RotateRight,
        Action::RotateLeft,
        Action::PointerEnter,
        Action::RotateLeft,
    ];
    for action in actions {
        h.dispatch(action);
    }
    // 4 left, 1 right, hover does not rotate
    assert!(approx(h.angle(), PI + 0.2 * 4.0 - 0.2));
}

#[test]
fn test_rotation_is_not_wrapped() {
    let mut h = TestHarness::new();
    for _ in 0..40 {
        h.rotate_left();
    }
    assert!(approx(h.angle(), PI + 8.0));
}

#[test]
fn test_displayed_yaw_includes_reveal_offset() {
    let mut h = TestHarness::new();
    h.rotate_right();
    h.tick(FRAME);
    assert!(approx(h.yaw(), PI - 0.2 + 0.08));
}

// ── Upload normalization ─────────────────────────────────────

#[test]
fn test_png_skips_converter_and_round_trips() {
    let mut h = TestHarness::new();
    let original = fixtures::png_bytes(4, 4, [10, 20, 30, 255]);
    h.upload(case_customizer_lib::normalize::ImageSource::new(
        "art.png",
        "image/png",
        original.clone(),
    ));
    h.settle();

    assert!(h.converter_calls().is_empty());

    let image = h.state().current_image().unwrap();
    assert!(image.url.starts_with("data:image/png;base64,"));
    assert!(!image.is_object_url());
    let (mime, bytes) = decode_data_url(&image.url).unwrap();
    assert_eq!(mime, "image/png");
    assert_eq!(bytes, original);
    assert_eq!(image.status, DecodeStatus::Ready);
}

#[test]
fn test_heic_converts_to_jpeg_at_quality_0_8() {
    let mut h = TestHarness::new();
    h.upload_heic("IMG_0001.HEIC");
    h.settle();

    assert_eq!(
        h.converter_calls(),
        vec![ConversionRequest {
            target: TargetFormat::Jpeg,
            quality: 0.8,
        }]
    );

    let image = h.state().current_image().unwrap();
    assert!(image.is_object_url());
    assert!(image.url.starts_with("blob:"));
    assert!(!image.url.contains("IMG_0001"));
    assert_eq!(image.mime, "image/jpeg");

    let id = image.id;
    assert_eq!(h.surface_sources(), vec![Some(id), Some(id)]);
}

#[test]
fn test_heic_failure_keeps_previous_image() {
    let mut h = TestHarness::with_failing_converter();
    h.upload_png("first.png", [255, 0, 0, 255]);
    h.settle();
    let first = h.current_image_id().unwrap();

    h.upload_heic("broken.heic");
    h.settle();

    assert_eq!(h.converter_calls().len(), 1);
    assert_eq!(h.current_image_id(), Some(first));
    assert_eq!(h.surface_sources(), vec![Some(first), Some(first)]);
    let error = h.snapshot().last_error.unwrap();
    assert!(error.starts_with("HEIC conversion failed"), "{error}");
}

#[test]
fn test_missing_file_reports_error() {
    let mut h = TestHarness::new();
    assert!(h.upload_path("/definitely/not/here.png").is_some());
    h.settle();
    assert!(h.current_image_id().is_none());
    assert!(h.snapshot().last_error.is_some());
}

// ── Binding ───────────────────────────────────────────────────

#[test]
fn test_latest_upload_wins() {
    let mut h = TestHarness::new();
    h.upload_png("a.png", [255, 0, 0, 255]);
    h.upload_png("b.png", [0, 0, 255, 255]);
    h.settle();

    let current = h.state().current_image().unwrap();
    let decoded = decode_data_url(&current.url).unwrap().1;
    assert_eq!(decoded, fixtures::png_bytes(4, 4, [0, 0, 255, 255]));

    let id = current.id;
    assert_eq!(h.surface_sources(), vec![Some(id), Some(id)]);
    // The stale upload never registered a resource
    assert_eq!(h.live_resources(), 1);
}

#[test]
fn test_replacing_image_releases_previous_resource() {
    let mut h = TestHarness::new();
    h.upload_png("a.png", [255, 0, 0, 255]);
    h.settle();
    let a = h.current_image_id().unwrap();

    h.upload_png("b.png", [0, 255, 0, 255]);
    h.settle();
    let b = h.current_image_id().unwrap();

    assert_ne!(a, b);
    assert_eq!(h.live_resources(), 1);
    assert_eq!(h.surface_sources(), vec![Some(b), Some(b)]);
}

#[test]
fn test_bound_texture_pixels_match_upload() {
    let mut h = TestHarness::new();
    h.upload_png("green.png", [0, 200, 0, 255]);
    h.settle();

    let model = h.state().model_view().model().unwrap();
    for surface in model.surfaces() {
        let texture = surface.material.texture.as_ref().unwrap();
        assert_eq!((texture.width, texture.height), (4, 4));
        assert_eq!(texture.pixel(0, 0), [0, 200, 0, 255]);
        assert!(!texture.flipped_y);
    }
}

#[test]
fn test_image_uploaded_before_model_binds_on_mount() {
    let mut settings = AppSettings::default();
    settings.model.path = "/no/such/model.glb".into();
    let mut h = TestHarness::at_startup(settings, RecordingConverter::succeeding());

    h.upload_png("early.png", [1, 2, 3, 255]);
    h.settle();
    let id = h.current_image_id().unwrap();
    assert!(h.surface_sources().is_empty());

    h.state_mut()
        .mount_model_bytes(
            std::path::Path::new(fixtures::QUAD_MODEL_KEY),
            fixtures::quad_model_gltf().as_bytes(),
        )
        .unwrap();
    h.settle();
    assert_eq!(h.surface_sources(), vec![Some(id), Some(id)]);
}

#[test]
fn test_undecodable_upload_keeps_bound_texture() {
    let mut h = TestHarness::new();
    h.upload_png("first.png", [200, 10, 10, 255]);
    h.settle();
    let first = h.current_image_id().unwrap();

    h.upload(case_customizer_lib::normalize::ImageSource::new(
        "broken.png",
        "image/png",
        b"not a png".to_vec(),
    ));
    h.settle();

    assert_eq!(h.surface_sources(), vec![Some(first), Some(first)]);
    let model = h.state().model_view().model().unwrap();
    for surface in model.surfaces() {
        let texture = surface.material.texture.as_ref().unwrap();
        assert_eq!(texture.pixel(0, 0), [200, 10, 10, 255]);
    }
    let error = h.snapshot().last_error.unwrap();
    assert!(error.starts_with("texture decode failed"), "{error}");
}

#[test]
fn test_shutdown_releases_image_resources() {
    let mut h = TestHarness::new();
    h.upload_png("art.png", [1, 1, 1, 255]);
    h.settle();
    assert_eq!(h.live_resources(), 1);

    h.state_mut().shutdown();
    assert_eq!(h.live_resources(), 0);
    assert!(h.current_image_id().is_none());
}

// ── Hover ─────────────────────────────────────────────────────

#[test]
fn test_hover_enter_leave_converges_to_base_scale() {
    let mut h = TestHarness::new();
    h.tick(0.1);
    assert!(approx(h.scale(), 1.6));

    h.hover_enter();
    h.tick(1.5);
    assert!(approx(h.scale(), 1.7));
    assert!(h.snapshot().hovered);

    h.hover_leave();
    h.tick(1.5);
    assert!(approx(h.scale(), 1.6));
    assert!(!h.snapshot().hovered);
}

#[test]
fn test_hover_scale_moves_gradually() {
    let mut h = TestHarness::new();
    h.tick(0.1);
    h.hover_enter();
    h.tick(FRAME);
    let scale = h.scale();
    assert!(scale > 1.6 && scale < 1.7, "scale {scale}");
}

#[test]
fn test_hover_leave_mid_animation_returns_to_base_scale() {
    let mut h = TestHarness::new();
    h.tick(0.1);
    h.hover_enter();
    h.tick(FRAME);
    let partial = h.scale();
    assert!(partial > 1.6 && partial < 1.7, "scale {partial}");

    h.hover_leave();
    h.tick(FRAME);
    assert!(h.scale() < 1.7);
    h.tick(1.5);
    assert!(approx(h.scale(), 1.6), "scale {}", h.scale());
    assert!(!h.snapshot().hovered);
}

// ── Splash gate ───────────────────────────────────────────────

#[test]
fn test_splash_gate_opens_once_after_delay() {
    let mut settings = AppSettings::default();
    settings.model.path = "/no/such/model.glb".into();
    let mut h = TestHarness::at_startup(settings, RecordingConverter::succeeding());

    assert!(h.snapshot().loading);
    assert!(!h.advance_clock(Duration::from_millis(999)));
    assert!(h.snapshot().loading);

    assert!(h.advance_clock(Duration::from_millis(1)));
    assert!(!h.snapshot().loading);

    assert!(!h.advance_clock(Duration::from_millis(5000)));
    assert!(!h.snapshot().loading);
}

#[test]
fn test_missing_model_is_reported_after_gate() {
    let mut settings = AppSettings::default();
    settings.model.path = "/no/such/model.glb".into();
    let mut h = TestHarness::at_startup(settings, RecordingConverter::succeeding());

    h.advance_clock(Duration::from_secs(2));
    assert!(h.state().model_view().model().is_none());
    assert!(h.state().model_view().load_error().is_some());
}
