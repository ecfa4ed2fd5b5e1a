use glam::{Mat4, Vec3};

pub const FOV_Y_DEGREES: f32 = 70.0;
pub const Z_NEAR: f32 = 0.001;
pub const Z_FAR: f32 = 1000.0;

/// Shared perspective camera for every tableau.
pub struct Camera {
    pub position: Vec3,
    pub aspect: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 2.0),
            aspect: aspect_ratio(width, height),
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn view_projection(&self) -> Mat4 {
        let projection =
            Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), self.aspect, Z_NEAR, Z_FAR);
        let view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y);
        projection * view
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_tracks_viewport() {
        let mut camera = Camera::new(800, 600);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);

        camera.set_viewport(1920, 1080);
        assert!((camera.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn zero_sized_viewport_does_not_divide_by_zero() {
        let camera = Camera::new(0, 0);
        assert!(camera.aspect.is_finite());
    }

    #[test]
    fn view_projection_maps_origin_in_front_of_camera() {
        let camera = Camera::new(640, 480);
        let clip = camera.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        // Origin is 2 units ahead of the eye, well inside the frustum.
        let ndc_z = clip.z / clip.w;
        assert!(ndc_z > 0.0 && ndc_z < 1.0, "ndc z {} outside [0,1]", ndc_z);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
    }
}
