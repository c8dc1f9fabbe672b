// Library crate: exposes testable modules for integration tests and the agent interface.
// GUI-specific modules (app, ui, viewport rendering) remain in the binary crate.

pub mod command;
pub mod error;
pub mod fixtures;
pub mod harness;
pub mod i18n;
pub mod interaction;
pub mod lighting;
pub mod model;
pub mod normalize;
pub mod state;
pub mod texture;
pub mod upload;
pub mod validation;

/// Subset of viewport types needed by the model (MeshData, Aabb, Ray, picking).
/// The full viewport (camera, renderer, GL) stays in the binary crate.
pub mod viewport {
    pub mod mesh;
    pub mod picking;
}
