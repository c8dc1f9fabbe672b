//! Discrete user actions → state changes.

use serde::{Deserialize, Serialize};

use crate::state::rotation::RotationState;

/// Default rotation per press (radians)
pub const ROTATION_STEP: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    RotateLeft,
    RotateRight,
    PointerEnter,
    PointerLeave,
}

/// What an action asks the owning state to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateChange {
    Rotation(RotationState),
    Hover(bool),
}

/// Stateless translator from actions to state changes.
#[derive(Debug, Clone, Copy)]
pub struct InteractionController {
    step: f32,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(ROTATION_STEP)
    }
}

impl InteractionController {
    pub fn new(step: f32) -> Self {
        Self { step }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn translate(&self, rotation: RotationState, action: Action) -> StateChange {
        match action {
            Action::RotateLeft => StateChange::Rotation(RotationState {
                angle: rotation.angle - self.step,
            }),
            Action::RotateRight => StateChange::Rotation(RotationState {
                angle: rotation.angle + self.step,
            }),
            Action::PointerEnter => StateChange::Hover(true),
            Action::PointerLeave => StateChange::Hover(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(controller: &InteractionController, actions: &[Action]) -> f32 {
        let mut rotation = RotationState::default();
        for &action in actions {
            if let StateChange::Rotation(r) = controller.translate(rotation, action) {
                rotation = r;
            }
        }
        rotation.angle
    }

    #[test]
    fn test_single_steps() {
        let c = InteractionController::default();
        let start = RotationState { angle: 1.0 };
        match c.translate(start, Action::RotateRight) {
            StateChange::Rotation(r) => assert!((r.angle - 1.2).abs() < 1e-6),
            other => panic!("Expected rotation, got {other:?}"),
        }
        match c.translate(start, Action::RotateLeft) {
            StateChange::Rotation(r) => assert!((r.angle - 0.8).abs() < 1e-6),
            other => panic!("Expected rotation, got {other:?}"),
        }
    }

    #[test]
    fn test_sequence_is_linear_and_unwrapped() {
        let c = InteractionController::default();
        let actions = vec![Action::RotateRight; 40];
        let angle = apply(&c, &actions);
        // 40 * 0.2 = 8 rad, beyond 2π, not wrapped
        assert!((angle - (std::f32::consts::PI + 8.0)).abs() < 1e-4);
    }

    #[test]
    fn test_order_independent() {
        let c = InteractionController::default();
        use Action::*;
        let a = apply(&c, &[RotateLeft, RotateRight, RotateRight, RotateLeft, RotateRight]);
        let b = apply(&c, &[RotateRight, RotateRight, RotateRight, RotateLeft, RotateLeft]);
        assert!((a - b).abs() < 1e-5);
        assert!((a - (std::f32::consts::PI + 0.2)).abs() < 1e-5);
    }

    #[test]
    fn test_pointer_actions_map_to_hover() {
        let c = InteractionController::default();
        let r = RotationState::default();
        assert_eq!(c.translate(r, Action::PointerEnter), StateChange::Hover(true));
        assert_eq!(c.translate(r, Action::PointerLeave), StateChange::Hover(false));
    }

    #[test]
    fn test_action_serde() {
        let json = serde_json::to_string(&Action::RotateLeft).unwrap();
        assert_eq!(json, "\"rotate_left\"");
    }
}
