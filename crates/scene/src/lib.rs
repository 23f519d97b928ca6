//! Interactive marker scene: camera rays, hit testing, hover/select state
//! and per-frame screen projection.

pub mod camera;
pub mod entity;
pub mod markers;
pub mod palette;
pub mod picking;

pub use camera::*;
pub use entity::*;
pub use markers::*;
pub use palette::*;
pub use picking::*;
