//! Geographic value types: coordinates, viewports and lat/lon bounding boxes.
//!
//! Conventions:
//! - Angles are degrees.
//! - Longitudes are normalized to `(-180, 180]`.
//! - A `Viewport` with `east < west` wraps across the antimeridian.

use serde::{Deserialize, Serialize};

use crate::math::canonical_f64;

/// Wrap a longitude into `(-180, 180]`. In-range values come back bit-for-bit.
pub fn normalize_lon(lon: f64) -> f64 {
    if !lon.is_finite() || (lon > -180.0 && lon <= 180.0) {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps +180 to -180; keep the closed upper end.
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

/// Shortest angular distance between two longitudes, in `[0, 180]`.
pub fn lon_delta(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lon: f64,
}

impl GeoCoordinate {
    /// Builds a coordinate, clamping latitude to `[-90, 90]` and wrapping longitude.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: lat.clamp(-90.0, 90.0),
            lon: normalize_lon(lon),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Geographic rectangle currently visible on the globe.
///
/// Edges lie in `(-180, 180]` with one exception: full longitude coverage
/// (`Viewport::world()`, or any span of 360° or more) is spelled
/// `west = -180, east = 180`, so it never reads as a zero-width wrap.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Viewport {
    /// Normalizing constructor.
    ///
    /// Latitudes are clamped to `[-90, 90]` and swapped if given out of order;
    /// longitudes are wrapped into `(-180, 180]` and keep their order, so a
    /// result with `east < west` is a wrapping viewport. A longitude range of
    /// 360° or more becomes full coverage, the one case spelled `west = -180`.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        let north = north.clamp(-90.0, 90.0);
        let south = south.clamp(-90.0, 90.0);
        let (north, south) = if south <= north {
            (north, south)
        } else {
            (south, north)
        };
        if east - west >= 360.0 {
            return Self {
                north,
                south,
                east: 180.0,
                west: -180.0,
            };
        }
        Self {
            north,
            south,
            east: normalize_lon(east),
            west: normalize_lon(west),
        }
    }

    pub fn world() -> Self {
        Self {
            north: 90.0,
            south: -90.0,
            east: 180.0,
            west: -180.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.north.is_finite()
            && self.south.is_finite()
            && self.east.is_finite()
            && self.west.is_finite()
    }

    pub fn wraps_antimeridian(&self) -> bool {
        self.east < self.west
    }

    /// Longitudinal extent in degrees, treating wraparound modulo 360.
    pub fn lon_span(&self) -> f64 {
        if self.wraps_antimeridian() {
            self.east - self.west + 360.0
        } else {
            self.east - self.west
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn contains_lon(&self, lon: f64) -> bool {
        if self.wraps_antimeridian() {
            lon >= self.west || lon <= self.east
        } else {
            lon >= self.west && lon <= self.east
        }
    }

    pub fn contains(&self, coord: GeoCoordinate) -> bool {
        coord.lat >= self.south && coord.lat <= self.north && self.contains_lon(coord.lon)
    }

    /// Largest per-edge difference to `other`, in degrees.
    ///
    /// East/west edges are compared along the shorter arc so a viewport that
    /// slides across the antimeridian does not register a ~360° jump.
    pub fn max_edge_delta(&self, other: &Viewport) -> f64 {
        let dn = (self.north - other.north).abs();
        let ds = (self.south - other.south).abs();
        let de = lon_delta(self.east, other.east);
        let dw = lon_delta(self.west, other.west);
        dn.max(ds).max(de).max(dw)
    }

    /// Exact-equality key over the four edges (`-0.0` and `0.0` collapse).
    pub fn key(&self) -> [u64; 4] {
        [self.north, self.south, self.east, self.west].map(|v| canonical_f64(v).to_bits())
    }

    /// The viewport as one or two non-wrapping longitude intervals.
    pub fn lon_intervals(&self) -> ([f64; 2], Option<[f64; 2]>) {
        if self.wraps_antimeridian() {
            ([self.west, 180.0], Some([-180.0, self.east]))
        } else {
            ([self.west, self.east], None)
        }
    }
}

/// Lat/lon bounding box of a set of points (does not wrap).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// All four edges lie inside `viewport`.
    pub fn is_inside(&self, viewport: &Viewport) -> bool {
        if self.min_lat < viewport.south || self.max_lat > viewport.north {
            return false;
        }
        let (a, b) = viewport.lon_intervals();
        let inside = |iv: [f64; 2]| self.min_lon >= iv[0] && self.max_lon <= iv[1];
        inside(a) || b.is_some_and(inside)
    }

    /// Separating-axis rectangle overlap against `viewport`.
    pub fn overlaps(&self, viewport: &Viewport) -> bool {
        if self.max_lat < viewport.south || self.min_lat > viewport.north {
            return false;
        }
        let (a, b) = viewport.lon_intervals();
        let overlaps = |iv: [f64; 2]| !(self.max_lon < iv[0] || self.min_lon > iv[1]);
        overlaps(a) || b.is_some_and(overlaps)
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoBounds, GeoCoordinate, Viewport, lon_delta, normalize_lon};
    use pretty_assertions::assert_eq;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn normalize_lon_keeps_half_open_range() {
        assert_eq!(normalize_lon(180.0), 180.0);
        assert_eq!(normalize_lon(-180.0), 180.0);
        assert_eq!(normalize_lon(190.0), -170.0);
        assert_eq!(normalize_lon(-190.0), 170.0);
        assert_eq!(normalize_lon(540.0), 180.0);
        assert_eq!(normalize_lon(12.5), 12.5);
    }

    #[test]
    fn in_range_longitudes_are_untouched() {
        for tenth in -1799..=1800 {
            let lon = tenth as f64 / 10.0;
            assert_eq!(normalize_lon(lon).to_bits(), lon.to_bits(), "lon {lon}");
            let v = Viewport::new(30.0, 0.0, 180.0, lon);
            assert_eq!(v.west.to_bits(), lon.to_bits(), "west {lon}");
            assert_eq!(GeoCoordinate::new(0.0, lon).lon.to_bits(), lon.to_bits());
        }
    }

    #[test]
    fn bounds_on_the_viewport_edge_are_inside() {
        let v = Viewport::new(30.0, 0.0, 10.0, -0.6);
        assert_eq!(v.west, -0.6);
        assert!(GeoBounds::new(10.0, 20.0, -0.6, 5.0).is_inside(&v));
        assert!(GeoBounds::new(10.0, 20.0, -63.9, -63.6).is_inside(&Viewport::new(
            30.0, 0.0, -63.6, -63.9
        )));
    }

    #[test]
    fn lon_delta_takes_the_short_way_round() {
        assert_close(lon_delta(179.0, -179.0), 2.0, 1e-12);
        assert_close(lon_delta(-10.0, 10.0), 20.0, 1e-12);
        assert_close(lon_delta(0.0, 180.0), 180.0, 1e-12);
    }

    #[test]
    fn viewport_constructor_orders_and_wraps() {
        let v = Viewport::new(-10.0, 20.0, 200.0, 170.0);
        assert_eq!(v.north, 20.0);
        assert_eq!(v.south, -10.0);
        assert_eq!(v.east, -160.0);
        assert_eq!(v.west, 170.0);
        assert!(v.wraps_antimeridian());
        assert_close(v.lon_span(), 30.0, 1e-12);
        assert!(v.contains(GeoCoordinate::new(0.0, 179.0)));
        assert!(v.contains(GeoCoordinate::new(0.0, -170.0)));
        assert!(!v.contains(GeoCoordinate::new(0.0, 0.0)));
    }

    #[test]
    fn full_longitude_coverage_is_kept() {
        let v = Viewport::new(60.0, -60.0, 200.0, -200.0);
        assert_eq!((v.east, v.west), (180.0, -180.0));
        assert!(!v.wraps_antimeridian());
        assert_eq!(v.lon_span(), 360.0);
        assert_eq!(Viewport::world(), Viewport::new(90.0, -90.0, 180.0, -180.0));
    }

    #[test]
    fn key_is_exact_and_ignores_signed_zero() {
        let a = Viewport::new(10.0, 0.0, 20.0, -20.0);
        let b = Viewport::new(10.0, -0.0, 20.0, -20.0);
        let c = Viewport::new(10.0, 0.0, 20.0, -20.000001);
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn edge_delta_across_antimeridian_is_small() {
        let a = Viewport::new(10.0, -10.0, 179.0, 160.0);
        let b = Viewport::new(10.0, -10.0, -179.0, 162.0);
        assert_close(a.max_edge_delta(&b), 2.0, 1e-9);
    }

    #[test]
    fn bounds_dimensions() {
        let b = GeoBounds::new(10.0, 20.0, 0.0, 5.0);
        assert_eq!(b.width(), 5.0);
        assert_eq!(b.height(), 10.0);
        assert_eq!(b.area(), 50.0);
    }

    #[test]
    fn fully_inside_viewport() {
        let b = GeoBounds::new(10.0, 20.0, 0.0, 5.0);
        assert!(b.is_inside(&Viewport::new(30.0, 0.0, 10.0, -10.0)));
        assert!(!b.is_inside(&Viewport::new(15.0, 0.0, 10.0, -10.0)));
    }

    #[test]
    fn partial_overlap_uses_separating_axes() {
        let b = GeoBounds::new(10.0, 20.0, 0.0, 5.0);
        let clipped = Viewport::new(15.0, 0.0, 10.0, -10.0);
        assert!(b.overlaps(&clipped));
        assert!(!b.overlaps(&Viewport::new(50.0, 30.0, 10.0, -10.0)));
        assert!(!b.overlaps(&Viewport::new(30.0, 0.0, -1.0, -10.0)));
    }

    #[test]
    fn wrapping_viewport_tests_both_halves() {
        let v = Viewport::new(10.0, -10.0, -170.0, 170.0);
        let east_side = GeoBounds::new(-5.0, 5.0, -179.0, -175.0);
        let west_side = GeoBounds::new(-5.0, 5.0, 172.0, 178.0);
        let elsewhere = GeoBounds::new(-5.0, 5.0, 0.0, 10.0);
        assert!(east_side.is_inside(&v));
        assert!(west_side.is_inside(&v));
        assert!(!elsewhere.overlaps(&v));
    }
}
