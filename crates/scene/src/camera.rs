use foundation::math::{CameraPose, ScreenView, Vec3, geo_to_sphere};

use crate::picking::Ray;

pub const DEFAULT_FOV_Y_DEG: f64 = 75.0;
pub const DEFAULT_MIN_DISTANCE: f64 = 1.5;
pub const DEFAULT_MAX_DISTANCE: f64 = 3.0;

/// Perspective camera orbiting the globe.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_deg: f64,
    pub aspect: f64,
}

impl PerspectiveCamera {
    pub fn look_at(position: Vec3, target: Vec3, fov_y_deg: f64, aspect: f64) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            fov_y_deg,
            aspect,
        }
    }

    /// Camera looking at the globe center from `distance` above `(lat, lon)`.
    pub fn orbiting(lat: f64, lon: f64, distance: f64, aspect: f64) -> Self {
        Self::look_at(
            geo_to_sphere(lat, lon, distance),
            Vec3::ZERO,
            DEFAULT_FOV_Y_DEG,
            aspect,
        )
    }

    pub fn distance(&self) -> f64 {
        (self.position - self.target).length()
    }

    /// Keep the orbit distance within `[min, max]`, preserving direction.
    pub fn clamp_distance(&mut self, min: f64, max: f64) {
        let offset = self.position - self.target;
        let d = offset.length();
        let Some(dir) = offset.normalize() else {
            return;
        };
        let clamped = d.clamp(min, max);
        if clamped != d {
            self.position = self.target + dir.scale(clamped);
        }
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position - self.target,
            fov_y_deg: self.fov_y_deg,
            aspect: self.aspect,
        }
    }

    /// Direction from the target toward the camera.
    pub fn view_dir(&self) -> Vec3 {
        self.position - self.target
    }

    pub fn screen_view(&self, width: f64, height: f64) -> ScreenView {
        let mut view = ScreenView::new(self.view_dir(), width, height);
        view.up = self.up;
        view
    }

    /// Pixel coordinates (origin top-left) to normalized device coordinates.
    pub fn ndc_from_pixels(x_px: f64, y_px: f64, width: f64, height: f64) -> Option<(f64, f64)> {
        if !(width > 0.0) || !(height > 0.0) {
            return None;
        }
        Some((2.0 * x_px / width - 1.0, 1.0 - 2.0 * y_px / height))
    }

    pub fn ray_through_ndc(&self, ndc_x: f64, ndc_y: f64) -> Option<Ray> {
        let forward = (self.target - self.position).normalize()?;
        let right = forward
            .cross(self.up)
            .normalize()
            .or_else(|| forward.cross(Vec3::new(0.0, 0.0, 1.0)).normalize())?;
        let up = right.cross(forward);
        let tan_half = (self.fov_y_deg.to_radians() * 0.5).tan();
        let dir = forward
            + right.scale(ndc_x * tan_half * self.aspect)
            + up.scale(ndc_y * tan_half);
        Some(Ray::new(self.position, dir.normalize()?))
    }

    pub fn ray_through_pixels(&self, x_px: f64, y_px: f64, width: f64, height: f64) -> Option<Ray> {
        let (nx, ny) = Self::ndc_from_pixels(x_px, y_px, width, height)?;
        self.ray_through_ndc(nx, ny)
    }
}
