//! Named lighting environments.

use glam::Vec3;

pub const DEFAULT_PRESET: &str = "city";

#[derive(Debug, Clone, PartialEq)]
pub struct LightingPreset {
    pub name: &'static str,
    pub ambient: f32,
    pub directional: f32,
    /// Direction the light comes from (normalized)
    pub light_dir: Vec3,
    /// Clear color RGB
    pub background: [u8; 3],
}

const PRESETS: &[(&str, f32, f32, [f32; 3], [u8; 3])] = &[
    ("city", 0.5, 0.3, [5.0, 5.0, 5.0], [236, 238, 242]),
    ("studio", 0.6, 0.4, [2.0, 6.0, 4.0], [245, 245, 245]),
    ("sunset", 0.35, 0.5, [-6.0, 2.0, 3.0], [250, 222, 196]),
];

impl LightingPreset {
    /// Look up a preset by name; unknown names fall back to the default.
    pub fn resolve(name: &str) -> Self {
        let found = PRESETS.iter().find(|p| p.0.eq_ignore_ascii_case(name.trim()));
        let preset = match found {
            Some(p) => p,
            None => {
                tracing::warn!("Unknown lighting preset {name:?}, using {DEFAULT_PRESET:?}");
                &PRESETS[0]
            }
        };
        let (name, ambient, directional, dir, background) = *preset;
        Self {
            name,
            ambient,
            directional,
            light_dir: Vec3::from(dir).normalize(),
            background,
        }
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        PRESETS.iter().map(|p| p.0)
    }
}

impl Default for LightingPreset {
    fn default() -> Self {
        Self::resolve(DEFAULT_PRESET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_intensities() {
        let city = LightingPreset::resolve("city");
        assert_eq!(city.ambient, 0.5);
        assert_eq!(city.directional, 0.3);
        assert!((city.light_dir.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_falls_back() {
        assert_eq!(LightingPreset::resolve("moon").name, DEFAULT_PRESET);
        assert_eq!(LightingPreset::resolve("Studio").name, "studio");
    }

    #[test]
    fn test_names_include_default() {
        assert!(LightingPreset::names().any(|n| n == DEFAULT_PRESET));
    }
}
