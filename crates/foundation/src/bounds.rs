use crate::math::Vec3;

/// Axis-aligned bounding box in scene space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb3 {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Aabb3 { min, max }
    }

    /// Cube of half-extent `half` centered on `center`.
    pub fn around(center: Vec3, half: f64) -> Self {
        let half = half.abs();
        Aabb3 {
            min: [center.x - half, center.y - half, center.z - half],
            max: [center.x + half, center.y + half, center.z + half],
        }
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
            0.5 * (self.min[2] + self.max[2]),
        )
    }

    pub fn contains(&self, p: Vec3) -> bool {
        let p = p.as_array();
        (0..3).all(|axis| p[axis] >= self.min[axis] && p[axis] <= self.max[axis])
    }
}
