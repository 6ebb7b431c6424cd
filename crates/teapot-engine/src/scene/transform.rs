use std::str::FromStr;

use anyhow::anyhow;
use glam::{Mat4, Vec3};

/// How a drag angle is applied to the model rotation.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum RotationMode {
    /// Rebuild the model matrix from identity with the given angle.
    ///
    /// Only the displacement of the current drag is significant.
    #[default]
    Replace,
    /// Add the given angle to the current orientation.
    Accumulate,
}

impl FromStr for RotationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "accumulate" => Ok(Self::Accumulate),
            other => Err(anyhow!("unknown rotation mode {other:?} (expected replace or accumulate)")),
        }
    }
}

/// Camera placement used by the sample.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees before the landscape correction.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(30.0, -200.0, 20.0),
            target: Vec3::ZERO,
            up: Vec3::Z,
            fov_degrees: 45.0,
            near: 0.1,
            far: 300.0,
        }
    }
}

/// Vulkan clip space has inverted Y and half Z compared to GL.
const CLIP: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0, //
    0.0, -1.0, 0.0, 0.0, //
    0.0, 0.0, 0.5, 0.0, //
    0.0, 0.0, 0.5, 1.0, //
]);

/// Model-view-projection state uploaded to the uniform buffer.
///
/// Projection, view and clip are fixed at construction; only the model
/// rotation (about +Z, the camera's up axis) changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MvpTransform {
    projection: Mat4,
    view: Mat4,
    model: Mat4,
    angle_degrees: f32,
    mvp: Mat4,
}

impl MvpTransform {
    /// Builds the transform for a viewport of `width` x `height` pixels.
    pub fn new(camera: &Camera, width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);

        let mut fov = camera.fov_degrees.to_radians();
        if w > h {
            fov *= h / w;
        }

        let projection = Mat4::perspective_rh_gl(fov, w / h, camera.near, camera.far);
        let view = Mat4::look_at_rh(camera.eye, camera.target, camera.up);

        let mut t = Self {
            projection,
            view,
            model: Mat4::IDENTITY,
            angle_degrees: 0.0,
            mvp: Mat4::IDENTITY,
        };
        t.recompute();
        t
    }

    /// Applies a drag angle (degrees) to the model rotation and recomputes MVP.
    pub fn rotate(&mut self, degrees: f32, mode: RotationMode) {
        self.angle_degrees = match mode {
            RotationMode::Replace => degrees,
            RotationMode::Accumulate => (self.angle_degrees + degrees) % 360.0,
        };
        self.model = Mat4::from_rotation_z(self.angle_degrees.to_radians());
        self.recompute();
    }

    /// Current model rotation about +Z in degrees.
    pub fn angle_degrees(&self) -> f32 {
        self.angle_degrees
    }

    #[cfg(test)]
    fn model(&self) -> Mat4 {
        self.model
    }

    /// Combined `clip * projection * view * model`.
    pub fn mvp(&self) -> Mat4 {
        self.mvp
    }

    /// Column-major matrix data, as laid out in the uniform buffer.
    pub fn uniform_data(&self) -> [f32; 16] {
        self.mvp.to_cols_array()
    }

    fn recompute(&mut self) {
        self.mvp = CLIP * self.projection * self.view * self.model;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn starts_at_identity_model() {
        let t = MvpTransform::new(&Camera::default(), 800, 600);
        assert_eq!(t.model(), Mat4::IDENTITY);
        assert_eq!(t.angle_degrees(), 0.0);
    }

    #[test]
    fn rotates_about_z() {
        let mut t = MvpTransform::new(&Camera::default(), 800, 600);
        t.rotate(90.0, RotationMode::Replace);

        let x = t.model().transform_vector3(Vec3::X);
        assert!(approx(x, Vec3::Y), "got {x:?}");
        let z = t.model().transform_vector3(Vec3::Z);
        assert!(approx(z, Vec3::Z));
    }

    #[test]
    fn replace_does_not_compose() {
        let mut t = MvpTransform::new(&Camera::default(), 800, 600);
        t.rotate(30.0, RotationMode::Replace);
        t.rotate(45.0, RotationMode::Replace);
        assert_eq!(t.angle_degrees(), 45.0);
    }

    #[test]
    fn accumulate_composes() {
        let mut t = MvpTransform::new(&Camera::default(), 800, 600);
        t.rotate(30.0, RotationMode::Accumulate);
        t.rotate(45.0, RotationMode::Accumulate);
        assert!((t.angle_degrees() - 75.0).abs() < 1e-4);
    }

    #[test]
    fn mvp_places_origin_inside_clip_volume() {
        let t = MvpTransform::new(&Camera::default(), 800, 600);
        let p = t.mvp() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = p.truncate() / p.w;

        assert!(p.w > 0.0);
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0, "depth {}", ndc.z);
    }

    #[test]
    fn uniform_data_is_column_major_mvp() {
        let t = MvpTransform::new(&Camera::default(), 640, 480);
        assert_eq!(t.uniform_data(), t.mvp().to_cols_array());
    }

    #[test]
    fn rotation_mode_parses() {
        assert_eq!("Replace".parse::<RotationMode>().unwrap(), RotationMode::Replace);
        assert_eq!("accumulate".parse::<RotationMode>().unwrap(), RotationMode::Accumulate);
        assert!("spin".parse::<RotationMode>().is_err());
    }
}
