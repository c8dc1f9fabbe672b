//! 3D viewport panel with OpenGL rendering

mod camera;
mod gl_renderer;
pub use case_customizer_lib::viewport::{mesh, picking};

use std::sync::{Arc, Mutex};

use egui::Ui;

use crate::i18n::t;
use crate::state::AppState;
use case_customizer_lib::interaction::Action;
use camera::ArcBallCamera;
use gl_renderer::{GlRenderer, RenderParams, SurfaceDraw};

/// 3D viewport panel with OpenGL rendering
pub struct ViewportPanel {
    camera: ArcBallCamera,
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
    /// Load generation the camera was last framed for
    framed_generation: u64,
}

impl ViewportPanel {
    pub fn new(state: &AppState) -> Self {
        let vp = &state.settings.viewport;
        Self {
            camera: ArcBallCamera::new(vp.fov_degrees, vp.orbit_damping),
            gl_renderer: None,
            framed_generation: 0,
        }
    }

    /// Initialize GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context) {
        let renderer = GlRenderer::new(gl);
        self.gl_renderer = Some(Arc::new(Mutex::new(renderer)));
    }

    /// Release GPU resources
    pub fn destroy_gl(&mut self, gl: &glow::Context) {
        if let Some(renderer) = self.gl_renderer.take() {
            if let Ok(mut r) = renderer.lock() {
                r.destroy(gl);
            }
        }
    }

    /// Forget the current framing so the next frame re-fits the model
    pub fn reset_camera(&mut self) {
        self.framed_generation = 0;
    }

    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        if let Some(error) = state.model_view().load_error() {
            let error = error.to_string();
            ui.centered_and_justified(|ui| {
                ui.colored_label(
                    egui::Color32::from_rgb(200, 60, 50),
                    format!("{}\n{error}", t("vp.model_error")),
                );
            });
            return;
        }

        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        if state.model_view().model().is_none() {
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                t("vp.no_model"),
                egui::FontId::proportional(14.0),
                egui::Color32::from_rgb(120, 120, 130),
            );
            return;
        }

        self.frame_if_needed(rect, state);

        // ── Camera controls ─────────────────────────────
        self.handle_camera(&response, ui);

        // ── Hover ─────────────────────────────
        self.handle_hover(&response, rect, state);

        if !ui.is_rect_visible(rect) {
            return;
        }

        // ── GL rendering ────────────────────────────────────────
        self.render_gl(ui, rect, state);
    }

    fn frame_if_needed(&mut self, rect: egui::Rect, state: &AppState) {
        let generation = state.model_view().load_generation();
        if generation == self.framed_generation {
            return;
        }
        let aspect = rect.width() / rect.height().max(1.0);
        if let Some(framing) = state.model_view().framing(self.camera.fov, aspect) {
            self.camera.apply_framing(&framing);
            self.framed_generation = generation;
        }
    }

    fn handle_camera(&mut self, response: &egui::Response, ui: &Ui) {
        if response.is_pointer_button_down_on() && !response.dragged() {
            self.camera.hold();
        }

        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            self.camera.rotate(-delta.x * 0.5, delta.y * 0.5);
        } else if self.camera.update_inertia() {
            ui.ctx().request_repaint();
        }

        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if response.hovered() && scroll.abs() > 0.1 {
            self.camera.zoom(scroll * 0.01);
        }
    }

    /// Dispatch pointer enter/leave only when the hit state flips.
    fn handle_hover(&mut self, response: &egui::Response, rect: egui::Rect, state: &mut AppState) {
        let over_model = match response.hover_pos() {
            Some(pos) => {
                let ray = self.camera.screen_ray(pos, rect);
                state
                    .model_view()
                    .model()
                    .is_some_and(|model| model.hit_test(&ray))
            }
            None => false,
        };

        if over_model != state.model_view().is_hovered() {
            let action = if over_model {
                Action::PointerEnter
            } else {
                Action::PointerLeave
            };
            state.dispatch(action);
        }
    }

    fn render_gl(&self, ui: &mut Ui, rect: egui::Rect, state: &mut AppState) {
        let Some(gl_renderer) = &self.gl_renderer else {
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "OpenGL unavailable",
                egui::FontId::proportional(14.0),
                egui::Color32::from_rgb(120, 120, 130),
            );
            return;
        };

        let generation = state.model_view().load_generation();
        let Some(model) = state.model_view_mut().model_mut() else {
            return;
        };
        let dirty = model.take_dirty();
        if !dirty.is_empty() {
            tracing::debug!("{} surfaces need texture sync", dirty.len());
            if let Ok(mut r) = gl_renderer.lock() {
                r.mark_dirty(dirty);
            }
        }

        let draws: Vec<SurfaceDraw> = model
            .surfaces()
            .iter()
            .map(|s| SurfaceDraw {
                mesh: s.mesh.clone(),
                base_color: s.material.base_color,
                texture: s.material.texture.clone(),
            })
            .collect();
        let model_matrix = model.model_matrix();

        let aspect = rect.width() / rect.height().max(1.0);
        let view_projection = self.camera.view_projection(aspect);
        let lighting = state.lighting.clone();

        let renderer_clone = gl_renderer.clone();
        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();

                let clip = info.clip_rect_in_pixels();
                let viewport = [
                    clip.left_px as f32,
                    clip.from_bottom_px as f32,
                    clip.width_px as f32,
                    clip.height_px as f32,
                ];

                if let Ok(mut r) = renderer_clone.lock() {
                    r.sync_surfaces(gl, generation, &draws);

                    let params = RenderParams {
                        viewport,
                        view_projection,
                        model: model_matrix,
                        bg_color: lighting.background,
                        ambient: lighting.ambient,
                        directional: lighting.directional,
                        light_dir: lighting.light_dir,
                    };
                    r.paint(gl, &params);
                }
            })),
        };

        ui.painter().add(callback);
    }
}
