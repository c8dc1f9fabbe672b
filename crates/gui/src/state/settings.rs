//! Application settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::i18n::Lang;
use crate::model::SpringConfig;

/// Splash screen settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingSettings {
    /// How long the splash stays up after startup (milliseconds)
    pub splash_ms: u64,
}

impl Default for LoadingSettings {
    fn default() -> Self {
        Self { splash_ms: 1000 }
    }
}

/// Model asset and presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// glTF/GLB file to display
    pub path: PathBuf,
    /// Added to the rotation angle so the model starts slightly turned (radians)
    pub reveal_offset: f32,
    /// Resting scale
    pub base_scale: f32,
    /// Scale while the pointer is over the model
    pub hover_scale: f32,
    /// Bounds-fit margin (1.0 = touching the viewport edge)
    pub fit_margin: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assets/iPhone16.glb"),
            reveal_offset: 0.08,
            base_scale: 1.6,
            hover_scale: 1.7,
            fit_margin: 1.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Rotation per button press (radians)
    pub rotation_step: f32,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            rotation_step: crate::interaction::ROTATION_STEP,
        }
    }
}

/// Upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// JPEG quality for converted HEIC files (0.0 - 1.0)
    pub heic_quality: f32,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self { heic_quality: 0.8 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    /// Named environment preset
    pub preset: String,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            preset: crate::lighting::DEFAULT_PRESET.to_string(),
        }
    }
}

/// Viewport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Vertical field of view (degrees)
    pub fov_degrees: f32,
    /// Orbit inertia damping factor (0.0 - 1.0)
    pub orbit_damping: f32,
    /// Enable anti-aliasing
    pub antialiasing: bool,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            orbit_damping: 0.1,
            antialiasing: true,
        }
    }
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Font size in points
    pub font_size: f32,
    pub language: Lang,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            language: Lang::default(),
        }
    }
}

/// All application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub loading: LoadingSettings,
    pub model: ModelSettings,
    pub interaction: InteractionSettings,
    pub upload: UploadSettings,
    pub lighting: LightingSettings,
    /// Hover scale easing
    pub spring: SpringConfig,
    pub viewport: ViewportSettings,
    pub ui: UiSettings,
}

impl AppSettings {
    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = project_dirs() {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                match serde_json::from_str(&json) {
                    Ok(settings) => return settings,
                    Err(e) => {
                        tracing::warn!("Ignoring malformed {}: {e}", config_path.display())
                    }
                }
            }
        }
        Self::default()
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(dirs) = project_dirs() {
            let config_dir = dirs.config_dir();
            if std::fs::create_dir_all(config_dir).is_ok() {
                let config_path = config_dir.join("settings.json");
                if let Ok(json) = serde_json::to_string_pretty(self) {
                    let _ = std::fs::write(config_path, json);
                }
            }
        }
    }

    pub fn splash_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.loading.splash_ms)
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "embrace", "case-customizer")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = AppSettings::default();
        assert_eq!(s.loading.splash_ms, 1000);
        assert_eq!(s.model.reveal_offset, 0.08);
        assert_eq!(s.model.base_scale, 1.6);
        assert_eq!(s.model.hover_scale, 1.7);
        assert_eq!(s.interaction.rotation_step, 0.2);
        assert_eq!(s.upload.heic_quality, 0.8);
        assert_eq!(s.lighting.preset, "city");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s: AppSettings =
            serde_json::from_str(r#"{ "loading": { "splash_ms": 600 }, "model": { "path": "x.glb" } }"#)
                .unwrap();
        assert_eq!(s.loading.splash_ms, 600);
        assert_eq!(s.model.path, PathBuf::from("x.glb"));
        assert_eq!(s.model.hover_scale, 1.7);
        assert_eq!(s.spring.tension, 170.0);
    }
}
