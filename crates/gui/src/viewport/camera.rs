use glam::{Mat4, Vec3, Vec4};

use case_customizer_lib::model::Framing;

use super::picking::Ray;

/// Orbit camera with damped inertia
pub struct ArcBallCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
    /// Fraction of orbit velocity removed per frame (0 = no inertia decay)
    pub damping: f32,
    /// Residual orbit velocity (yaw, pitch) in radians per frame
    velocity: (f32, f32),
    /// Distance the last framing chose; zoom is limited relative to it
    fit_distance: f32,
}

impl ArcBallCamera {
    pub fn new(fov_degrees: f32, damping: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: 6.0,
            target: Vec3::ZERO,
            fov: fov_degrees.to_radians(),
            damping: damping.clamp(0.0, 1.0),
            velocity: (0.0, 0.0),
            fit_distance: 6.0,
        }
    }

    /// Drag by (dx, dy) degrees; the motion carries on after release.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let (vx, vy) = (dx.to_radians(), dy.to_radians());
        self.velocity = (vx, vy);
        self.apply_orbit(vx, vy);
    }

    /// Apply one frame of inertia. Returns true while still moving.
    pub fn update_inertia(&mut self) -> bool {
        let (vx, vy) = self.velocity;
        if vx.abs() < 1e-5 && vy.abs() < 1e-5 {
            self.velocity = (0.0, 0.0);
            return false;
        }
        let keep = 1.0 - self.damping;
        self.velocity = (vx * keep, vy * keep);
        self.apply_orbit(self.velocity.0, self.velocity.1);
        true
    }

    /// Stop inertia (pointer pressed again).
    pub fn hold(&mut self) {
        self.velocity = (0.0, 0.0);
    }

    fn apply_orbit(&mut self, dyaw: f32, dpitch: f32) {
        self.yaw += dyaw;
        self.pitch = (self.pitch + dpitch).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, delta: f32) {
        let min = self.fit_distance * 0.3;
        let max = self.fit_distance * 4.0;
        self.distance = (self.distance * (1.0 - delta)).clamp(min, max);
    }

    /// Look at a framed model from the front.
    pub fn apply_framing(&mut self, framing: &Framing) {
        self.target = framing.target;
        self.distance = framing.distance;
        self.fit_distance = framing.distance;
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.velocity = (0.0, 0.0);
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let cy = self.yaw.cos();
        let sy = self.yaw.sin();
        let cp = self.pitch.cos();
        let sp = self.pitch.sin();

        self.target
            + Vec3::new(
                self.distance * cp * sy,
                self.distance * sp,
                self.distance * cp * cy,
            )
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let near = (self.distance * 0.01).max(0.01);
        Mat4::perspective_rh_gl(self.fov, aspect, near, self.distance * 10.0 + 10.0)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Cast a ray from a screen position into the 3D scene
    pub fn screen_ray(&self, screen_pos: egui::Pos2, rect: egui::Rect) -> Ray {
        let aspect = rect.width() / rect.height();

        // Screen → NDC
        let ndc_x = (screen_pos.x - rect.center().x) / (rect.width() * 0.5);
        let ndc_y = -(screen_pos.y - rect.center().y) / (rect.height() * 0.5);

        let vp_inv = self.view_projection(aspect).inverse();

        let near_world = vp_inv * Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far_world = vp_inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);

        let near = near_world.truncate() / near_world.w;
        let far = far_world.truncate() / far_world.w;

        Ray {
            origin: self.eye_position(),
            direction: (far - near).normalize_or_zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inertia_decays_to_rest() {
        let mut cam = ArcBallCamera::new(50.0, 0.1);
        cam.rotate(10.0, 0.0);
        let after_drag = cam.yaw;
        let mut frames = 0;
        while cam.update_inertia() {
            frames += 1;
            assert!(frames < 1000);
        }
        assert!(cam.yaw > after_drag);
        assert!(frames > 10);
    }

    #[test]
    fn test_framing_resets_view() {
        let mut cam = ArcBallCamera::new(50.0, 0.1);
        cam.rotate(30.0, 20.0);
        cam.apply_framing(&Framing {
            target: Vec3::new(0.0, 1.0, 0.0),
            distance: 4.0,
        });
        assert_eq!(cam.eye_position(), Vec3::new(0.0, 1.0, 4.0));
        assert!(!cam.update_inertia());
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let cam = ArcBallCamera::new(50.0, 0.1);
        let rect = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(200.0, 100.0));
        let ray = cam.screen_ray(rect.center(), rect);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }
}
