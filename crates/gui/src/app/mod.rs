//! Main application module

mod keyboard;
pub mod styles;

use std::sync::Arc;
use std::time::Instant;

use eframe::egui;

use crate::i18n::{self, t};
use crate::normalize::LibheifConverter;
use crate::state::settings::AppSettings;
use crate::state::AppState;
use crate::ui::{controls, header, loading, status_bar};
use crate::viewport::ViewportPanel;

/// Main application
pub struct CustomizerApp {
    /// Background workers for file reads, conversion and decoding
    _runtime: tokio::runtime::Runtime,
    state: AppState,
    viewport: ViewportPanel,
    /// Last applied font size (to detect changes)
    last_font_size: f32,
}

impl CustomizerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: tokio::runtime::Runtime,
        settings: AppSettings,
    ) -> Self {
        i18n::set_lang(settings.ui.language);

        // Apply initial styles with font size from settings
        styles::configure_styles(&cc.egui_ctx, settings.ui.font_size);
        let last_font_size = settings.ui.font_size;

        let state = AppState::new(
            settings,
            runtime.handle().clone(),
            Arc::new(LibheifConverter),
            Instant::now(),
        );

        let mut viewport = ViewportPanel::new(&state);

        // Initialize GL renderer if glow context is available
        if let Some(gl) = cc.gl.as_ref() {
            viewport.init_gl(gl);
        }

        Self {
            _runtime: runtime,
            state,
            viewport,
            last_font_size,
        }
    }

    fn choose_file(&mut self) {
        let path = rfd::FileDialog::new()
            .set_title(t("ctl.choose_title"))
            .add_filter(t("ctl.images"), shared::IMAGE_EXTENSIONS)
            .pick_file();
        if let Some(seq) = self.state.select_file(path) {
            tracing::debug!("Submitted upload #{seq}");
        }
    }
}

impl eframe::App for CustomizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply font size if changed
        if self.state.settings.ui.font_size != self.last_font_size {
            styles::apply_font_size(ctx, self.state.settings.ui.font_size);
            self.last_font_size = self.state.settings.ui.font_size;
        }

        // ── Background work and animation ─────────────────────
        self.state.advance(Instant::now());
        self.state.poll();
        let dt = ctx.input(|i| i.stable_dt).min(0.1);
        self.state.tick(dt);

        // ── Splash ─────────────────────────────────────────────
        if self.state.is_loading() {
            egui::CentralPanel::default().show(ctx, |ui| {
                loading::show(ui);
            });
            ctx.request_repaint();
            return;
        }

        keyboard::handle_keyboard(ctx, &mut self.state);

        // ── Header ────────────────────────────────────────────
        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(12, 8)),
            )
            .show(ctx, |ui| {
                header::show(ui, &mut self.state);
            });

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.state);
            });

        // ── Controls ─────────────────────────────────────────
        let mut actions = controls::ControlsResponse::default();
        egui::TopBottomPanel::bottom("controls")
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(12, 10)),
            )
            .show(ctx, |ui| {
                actions = controls::show(ui, &mut self.state);
            });
        if actions.choose_file {
            self.choose_file();
        }
        if actions.reset_camera {
            self.viewport.reset_camera();
        }

        // ── Central viewport ─────────────────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.state);
            });

        if self.state.is_busy() || self.state.model_view().is_animating() {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let Some(gl) = gl {
            self.viewport.destroy_gl(gl);
        }
        self.state.shutdown();
        self.state.settings.save();
    }
}
