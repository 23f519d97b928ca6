use foundation::bounds::Aabb3;
use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

use crate::entity::MarkerId;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir.scale(t)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub marker: MarkerId,
    pub distance: f64,
    pub point: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub max_distance: f64,
    /// Radius of the opaque globe; hits behind it are ignored.
    pub occluder_radius: Option<f64>,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            max_distance: 1.0e30,
            occluder_radius: Some(1.0),
        }
    }
}

/// Deterministic ray picking over marker hit boxes.
///
/// Ordering contract:
/// - The closest hit along the (normalized) ray wins.
/// - If multiple markers are hit at the same distance, the lower `MarkerId::index()` wins.
pub fn pick_nearest<'a, I>(candidates: I, ray: Ray, opts: PickOptions) -> Option<PickHit>
where
    I: IntoIterator<Item = (MarkerId, &'a Aabb3)>,
{
    let dir = ray.dir.normalize()?;
    let origin = ray.origin.as_array();
    let dir_a = dir.as_array();

    let mut max_t = opts.max_distance;
    if let Some(r) = opts.occluder_radius
        && let Some(t) = ray_sphere_entry_t(ray.origin, dir, r)
    {
        // Hit boxes straddle the surface, so allow entries slightly past it.
        max_t = max_t.min(t + 0.05 * r);
    }

    let mut best: Option<(f64, MarkerId)> = None;
    for (marker, bounds) in candidates {
        let Some(t) = ray_aabb_hit_t(origin, dir_a, bounds, 0.0, max_t) else {
            continue;
        };
        best = match best {
            None => Some((t, marker)),
            Some((bt, bm)) => {
                let ord = stable_total_cmp_f64(t, bt).then_with(|| marker.index().cmp(&bm.index()));
                if ord.is_lt() {
                    Some((t, marker))
                } else {
                    Some((bt, bm))
                }
            }
        };
    }

    let (t, marker) = best?;
    Some(PickHit {
        marker,
        distance: t,
        point: Ray::new(ray.origin, dir).at(t),
    })
}

/// Entry distance of a unit-direction ray into a sphere at the origin.
fn ray_sphere_entry_t(origin: Vec3, dir: Vec3, radius: f64) -> Option<f64> {
    let b = origin.dot(dir);
    let c = origin.dot(origin) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

fn ray_aabb_hit_t(
    origin: [f64; 3],
    dir: [f64; 3],
    bounds: &Aabb3,
    mut t_min: f64,
    mut t_max: f64,
) -> Option<f64> {
    // Slabs intersection; returns entry distance.
    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        let (min, max) = (bounds.min[axis], bounds.max[axis]);

        if d.abs() < 1e-12 {
            if o < min || o > max {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t1 = (min - o) * inv;
        let mut t2 = (max - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }

        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_max < t_min {
            return None;
        }
    }

    Some(t_min.max(0.0))
}
