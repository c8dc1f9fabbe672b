use egui::Ui;

use crate::app::styles::ACCENT;
use crate::i18n::t;
use crate::state::AppState;
use case_customizer_lib::interaction::Action;

/// What the control row asked for this frame
#[derive(Default)]
pub struct ControlsResponse {
    pub choose_file: bool,
    pub reset_camera: bool,
}

/// Rotate buttons, the Customize button and a camera reset.
pub fn show(ui: &mut Ui, state: &mut AppState) -> ControlsResponse {
    let mut response = ControlsResponse::default();

    ui.horizontal(|ui| {
        let total = ui.available_width();
        ui.add_space((total - 420.0).max(0.0) * 0.5);

        if ui.button(t("ctl.rotate_left")).clicked() {
            state.dispatch(Action::RotateLeft);
        }

        let customize = egui::Button::new(
            egui::RichText::new(t("ctl.customize"))
                .strong()
                .color(egui::Color32::WHITE),
        )
        .fill(ACCENT)
        .min_size(egui::vec2(140.0, 0.0));
        if ui.add(customize).clicked() {
            response.choose_file = true;
        }

        if ui.button(t("ctl.rotate_right")).clicked() {
            state.dispatch(Action::RotateRight);
        }

        ui.separator();

        if ui.small_button(t("ctl.reset_camera")).clicked() {
            response.reset_camera = true;
        }
    });

    response
}
