//! Globe projection math.
//!
//! One sphere convention is used by every caller (pins, border overlay, hit
//! boxes and the camera-to-viewport estimate):
//!
//! - `phi   = (90 - lat)` (polar angle from +Y)
//! - `theta = (lon + 180)` (azimuth in the XZ plane)
//! - `p = r * (sin(phi) cos(theta), cos(phi), sin(phi) sin(theta))`
//!
//! so `(0, 0)` maps to `-X`, the north pole to `+Y`, and `lon = ±180` to `+X`.

use crate::geo::{GeoCoordinate, Viewport, normalize_lon};
use crate::math::Vec3;

/// Points whose camera-facing component is above `-epsilon` still count as
/// visible, so pins sitting on the horizon do not flicker.
pub const DEFAULT_HORIZON_EPSILON: f64 = 0.1;

/// Fraction of the smaller container dimension covered by the globe radius.
pub const DEFAULT_SCREEN_SCALE: f64 = 0.4;

/// Camera poses closer to the origin than this cannot yield a viewport.
pub const MIN_POSE_DISTANCE: f64 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ProjectionError {
    /// Camera sits at (or numerically on) the globe center.
    Degenerate { distance: f64 },
    /// Field of view or aspect ratio cannot describe a frustum.
    InvalidFrustum { fov_y_deg: f64, aspect: f64 },
}

impl std::fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionError::Degenerate { distance } => {
                write!(f, "degenerate camera pose: distance to origin {distance}")
            }
            ProjectionError::InvalidFrustum { fov_y_deg, aspect } => {
                write!(f, "invalid frustum: fov_y={fov_y_deg}deg aspect={aspect}")
            }
        }
    }
}

impl std::error::Error for ProjectionError {}

/// Map a geographic coordinate onto a sphere of `radius` centered on the origin.
pub fn geo_to_sphere(lat: f64, lon: f64, radius: f64) -> Vec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = (lon + 180.0).to_radians();
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Inverse of [`geo_to_sphere`]; the radius is discarded.
///
/// Returns `None` for the zero vector or non-finite input.
pub fn sphere_to_geo(p: Vec3) -> Option<GeoCoordinate> {
    let r = p.length();
    if !(r > 0.0) || !r.is_finite() {
        return None;
    }
    let lat = 90.0 - (p.y / r).clamp(-1.0, 1.0).acos().to_degrees();
    let lon = normalize_lon(p.z.atan2(p.x).to_degrees() - 180.0);
    Some(GeoCoordinate { lat, lon })
}

/// Orthographic view onto the globe used for 2D overlays.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenView {
    /// Direction from the globe center toward the camera.
    pub view_dir: Vec3,
    /// Approximate screen-up direction in world space.
    pub up: Vec3,
    /// Container size in pixels.
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    pub horizon_epsilon: f64,
}

impl ScreenView {
    pub fn new(view_dir: Vec3, width: f64, height: f64) -> Self {
        Self {
            view_dir,
            up: Vec3::Y,
            width,
            height,
            scale: DEFAULT_SCREEN_SCALE,
            horizon_epsilon: DEFAULT_HORIZON_EPSILON,
        }
    }

    /// Orthonormal `(right, up, toward_camera)` basis, or `None` if `view_dir` is degenerate.
    pub fn basis(&self) -> Option<(Vec3, Vec3, Vec3)> {
        let forward = self.view_dir.normalize()?;
        let right = self
            .up
            .cross(forward)
            .normalize()
            // Looking straight down a pole: any horizontal axis works.
            .or_else(|| Vec3::new(0.0, 0.0, 1.0).cross(forward).normalize())?;
        let up = forward.cross(right);
        Some((right, up, forward))
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    /// Camera-facing component of the unit direction, in `[-1, 1]`.
    pub depth: f64,
    pub visible: bool,
}

/// Project a point on (or above) the globe to container pixels.
///
/// Pure and cheap; the render loop is expected to call it at most once per
/// frame per tracked point.
pub fn sphere_to_screen(p: Vec3, view: &ScreenView) -> ScreenPoint {
    let cx = view.width * 0.5;
    let cy = view.height * 0.5;
    let hidden = ScreenPoint {
        x: cx,
        y: cy,
        depth: -1.0,
        visible: false,
    };

    let (Some((right, up, forward)), Some(dir)) = (view.basis(), p.normalize()) else {
        return hidden;
    };

    let scale_px = view.width.min(view.height) * view.scale;
    let depth = dir.dot(forward);
    ScreenPoint {
        x: cx + dir.dot(right) * scale_px,
        y: cy - dir.dot(up) * scale_px,
        depth,
        visible: depth > -view.horizon_epsilon,
    }
}

/// Perspective camera pose in globe space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub fov_y_deg: f64,
    pub aspect: f64,
}

/// Estimate the visible geographic rectangle from a camera pose.
///
/// The frustum is treated as centered on the sub-camera point; the half
/// extents are `tan(fov/2) * distance` (radians of arc on the unit globe),
/// widened by the aspect ratio for longitude. The result only sizes queries.
pub fn camera_pose_to_viewport(pose: &CameraPose) -> Result<Viewport, ProjectionError> {
    let distance = pose.position.length();
    if !distance.is_finite() || distance < MIN_POSE_DISTANCE {
        return Err(ProjectionError::Degenerate { distance });
    }
    let frustum_ok = pose.fov_y_deg.is_finite()
        && pose.fov_y_deg > 0.0
        && pose.fov_y_deg < 180.0
        && pose.aspect.is_finite()
        && pose.aspect > 0.0;
    if !frustum_ok {
        return Err(ProjectionError::InvalidFrustum {
            fov_y_deg: pose.fov_y_deg,
            aspect: pose.aspect,
        });
    }

    let center = sphere_to_geo(pose.position).ok_or(ProjectionError::Degenerate { distance })?;

    let half_height = ((pose.fov_y_deg.to_radians() * 0.5).tan() * distance).to_degrees();
    let half_width = half_height * pose.aspect;

    let viewport = Viewport::new(
        center.lat + half_height,
        center.lat - half_height,
        center.lon + half_width,
        center.lon - half_width,
    );
    if !viewport.is_finite() {
        return Err(ProjectionError::Degenerate { distance });
    }
    Ok(viewport)
}
