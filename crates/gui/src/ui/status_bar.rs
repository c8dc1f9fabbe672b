use egui::Ui;

use crate::i18n::t;
use crate::state::{Activity, AppState};
use shared::DecodeStatus;

pub fn show(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui| {
        match state.activity() {
            Activity::Idle => {
                ui.weak(t("status.idle"));
            }
            Activity::Uploading(name) => {
                ui.spinner();
                ui.label(format!("{}: {name}", t("status.uploading")));
            }
            Activity::Decoding => {
                ui.spinner();
                ui.label(t("status.decoding"));
            }
        }

        ui.separator();

        match state.current_image() {
            Some(image) => {
                let status = match image.status {
                    DecodeStatus::Pending => "…",
                    DecodeStatus::Ready => "✔",
                    DecodeStatus::Failed => "✖",
                };
                ui.weak(format!(
                    "{}: {} ({} KB) {status}",
                    t("status.image"),
                    image.mime,
                    image.byte_len.div_ceil(1024)
                ));
            }
            None => {
                ui.weak(t("status.no_image"));
            }
        }

        if let Some(error) = state.last_error() {
            ui.separator();
            ui.colored_label(
                egui::Color32::from_rgb(200, 60, 50),
                format!("{}: {error}", t("status.error")),
            );
        }

        // Right-aligned angle readout
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(format!(
                "{}: {:.0}°",
                t("status.angle"),
                state.rotation().angle.to_degrees()
            ));
        });
    });
}
