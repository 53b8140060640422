use glam::{Mat4, Quat, Vec3};

use crate::config::ViewSettings;

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;
/// Half-width of the view frustum at unit distance.
const FRUSTUM_HALF_WIDTH: f32 = 0.8;

/// A viewpoint given as a position plus heading/pitch/roll in degrees.
///
/// Heading rotates about world Z starting from +X, pitch tilts the view up, roll spins it
/// around the viewing direction. World Z is up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub heading: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Camera {
    pub fn from_view(view: &ViewSettings) -> Self {
        let [heading, pitch, roll] = view.hpr;
        Self {
            eye: Vec3::from_array(view.xyz),
            heading,
            pitch,
            roll,
        }
    }

    pub fn forward(&self) -> Vec3 {
        let (h, p) = (self.heading.to_radians(), self.pitch.to_radians());
        Vec3::new(h.cos() * p.cos(), h.sin() * p.cos(), p.sin())
    }

    pub fn up(&self) -> Vec3 {
        let forward = self.forward();
        let right = forward.cross(Vec3::Z).normalize_or_zero();
        let level_up = if right == Vec3::ZERO {
            // Looking straight up or down; any horizontal up vector will do.
            Vec3::X
        } else {
            right.cross(forward)
        };
        Quat::from_axis_angle(forward, self.roll.to_radians()) * level_up
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.eye, self.forward(), self.up())
    }

    /// `aspect` is width over height.
    pub fn projection(aspect: f32) -> Mat4 {
        let fov_y = 2.0 * (FRUSTUM_HALF_WIDTH / aspect.max(f32::EPSILON)).atan();
        Mat4::perspective_rh(fov_y, aspect, NEAR, FAR)
    }

    pub fn uniform(&self, aspect: f32, light: Vec3) -> CameraUniform {
        CameraUniform {
            view_proj: (Self::projection(aspect) * self.view_matrix()).to_cols_array_2d(),
            eye: self.eye.extend(1.0).to_array(),
            light_dir: light.normalize_or_zero().extend(0.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
    pub light_dir: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(xyz: [f32; 3], hpr: [f32; 3]) -> Camera {
        Camera::from_view(&ViewSettings {
            xyz,
            hpr,
            ..ViewSettings::default()
        })
    }

    #[test]
    fn heading_180_looks_back_along_x() {
        let cam = camera([3.5, 0.0, 1.0], [-180.0, 0.0, 0.0]);
        assert!((cam.forward() - Vec3::NEG_X).length() < 1e-5);
        assert!((cam.up() - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn positive_pitch_looks_up() {
        let cam = camera([0.0; 3], [0.0, 30.0, 0.0]);
        assert!(cam.forward().z > 0.0);
    }

    #[test]
    fn roll_tilts_up_vector() {
        let cam = camera([0.0; 3], [0.0, 0.0, 90.0]);
        assert!(cam.up().z.abs() < 1e-5);
    }

    #[test]
    fn origin_projects_inside_clip_space() {
        let cam = camera([3.5, 0.0, 1.0], [-180.0, 0.0, 0.0]);
        let clip = Camera::projection(640.0 / 480.0) * cam.view_matrix() * glam::Vec4::W;
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1.0 && ndc.y.abs() < 1.0);
        assert!((0.0..1.0).contains(&ndc.z));
    }
}
