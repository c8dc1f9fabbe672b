use glam::Vec3;

use crate::viewport::picking::Aabb;

/// Camera placement that fits a bounding box in view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    pub target: Vec3,
    pub distance: f32,
}

impl Framing {
    /// Fit the bounding sphere of `bounds` (scaled by `scale`) into a camera with
    /// vertical field of view `fov_y` (radians) and the given aspect ratio.
    ///
    /// `margin` > 1 leaves a border around the model.
    pub fn fit(bounds: &Aabb, scale: f32, fov_y: f32, aspect: f32, margin: f32) -> Self {
        if bounds.is_empty() {
            return Self {
                target: Vec3::ZERO,
                distance: 1.0,
            };
        }

        let radius = (bounds.radius() * scale).max(1e-4);
        let fov_x = 2.0 * ((fov_y * 0.5).tan() * aspect.max(1e-4)).atan();
        let half_fov = fov_y.min(fov_x) * 0.5;

        Self {
            target: bounds.center() * scale,
            distance: margin * radius / half_fov.sin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Aabb {
        Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        }
    }

    #[test]
    fn test_fit_distance_scales_with_margin() {
        let fov = 50f32.to_radians();
        let tight = Framing::fit(&cube(), 1.0, fov, 1.0, 1.0);
        let loose = Framing::fit(&cube(), 1.0, fov, 1.0, 1.1);
        assert!((loose.distance / tight.distance - 1.1).abs() < 1e-4);
    }

    #[test]
    fn test_whole_sphere_visible() {
        let fov = 50f32.to_radians();
        let framing = Framing::fit(&cube(), 1.6, fov, 1.0, 1.1);
        let radius = cube().radius() * 1.6;
        // Angle subtended by the sphere stays inside the half FOV
        assert!((radius / framing.distance).asin() < fov * 0.5);
    }

    #[test]
    fn test_narrow_viewport_uses_horizontal_fov() {
        let fov = 50f32.to_radians();
        let wide = Framing::fit(&cube(), 1.0, fov, 2.0, 1.1);
        let narrow = Framing::fit(&cube(), 1.0, fov, 0.5, 1.1);
        assert!(narrow.distance > wide.distance);
    }

    #[test]
    fn test_offset_bounds_target_center() {
        let bounds = Aabb {
            min: Vec3::new(1.0, 0.0, 0.0),
            max: Vec3::new(3.0, 2.0, 0.0),
        };
        let framing = Framing::fit(&bounds, 2.0, 1.0, 1.0, 1.1);
        assert_eq!(framing.target, Vec3::new(4.0, 2.0, 0.0));
    }
}
