use egui::Ui;

use crate::i18n::t;

/// Full-panel splash shown until the loading gate opens.
pub fn show(ui: &mut Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.4);
            ui.heading(t("app.title"));
            ui.add_space(12.0);
            ui.add(egui::Spinner::new().size(28.0));
            ui.add_space(6.0);
            ui.weak(t("app.loading"));
        });
    });
}
