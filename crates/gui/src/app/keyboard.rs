//! Keyboard shortcut handling

use eframe::egui;

use crate::state::AppState;
use case_customizer_lib::interaction::Action;

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(ctx: &egui::Context, state: &mut AppState) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    let actions: Vec<Action> = ctx.input(|i| {
        let mut actions = Vec::new();
        // ← / → rotate like the on-screen buttons
        if i.key_pressed(egui::Key::ArrowLeft) {
            actions.push(Action::RotateLeft);
        }
        if i.key_pressed(egui::Key::ArrowRight) {
            actions.push(Action::RotateRight);
        }
        actions
    });

    for action in actions {
        state.dispatch(action);
    }
}
