use serde::{Deserialize, Serialize};

/// Accumulated model rotation about the vertical axis.
///
/// Never wrapped: ten presses right then ten left land exactly where they started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    /// Radians
    pub angle: f32,
}

impl Default for RotationState {
    fn default() -> Self {
        Self {
            angle: std::f32::consts::PI,
        }
    }
}
