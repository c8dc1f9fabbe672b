use egui::Ui;

use crate::i18n::{self, t, Lang};
use crate::state::AppState;
use case_customizer_lib::lighting::LightingPreset;

/// Branding plus language and lighting pickers.
pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.heading(t("app.title"));
        ui.weak(t("app.tagline"));

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.menu_button(t("menu.language"), |ui| {
                for (lang, label) in [(Lang::En, "English"), (Lang::Ru, "Русский")] {
                    if ui.radio(i18n::lang() == lang, label).clicked() {
                        i18n::set_lang(lang);
                        state.settings.ui.language = lang;
                        state.settings.save();
                        ui.close_menu();
                    }
                }
            });

            ui.menu_button(t("menu.lighting"), |ui| {
                for name in LightingPreset::names() {
                    if ui.radio(state.lighting.name == name, name).clicked() {
                        state.lighting = LightingPreset::resolve(name);
                        state.settings.lighting.preset = name.to_string();
                        state.settings.save();
                        ui.close_menu();
                    }
                }
            });
        });
    });
}
