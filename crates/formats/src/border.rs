//! Continent border overlay.
//!
//! Polygon and MultiPolygon features become closed rings of points on a
//! sphere slightly above the pins, using the same `geo_to_sphere` convention
//! so the outlines line up with the markers. Other geometry kinds are
//! skipped; the overlay is decorative.

use foundation::math::geo_to_sphere;
use foundation::math::Vec3;
use geojson::{Feature, GeoJson, Geometry, PolygonType, Value};
use thiserror::Error;

/// Border lines sit just above the pin radius (1.011) to avoid z-fighting.
pub const DEFAULT_BORDER_RADIUS: f64 = 1.012;

#[derive(Debug, Error)]
pub enum BorderError {
    #[error("invalid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),

    #[error("feature {feature}: {reason}")]
    InvalidPosition { feature: usize, reason: String },

    #[error("failed to load border geometry: {0}")]
    Load(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BorderRing {
    pub feature: usize,
    pub name: Option<String>,
    /// Closed loop; the first point is repeated at the end.
    pub points: Vec<Vec3>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BorderOverlay {
    pub radius: f64,
    pub rings: Vec<BorderRing>,
    pub features: usize,
    /// Features with no polygonal geometry.
    pub skipped: usize,
}

impl BorderOverlay {
    pub fn from_geojson(text: &str, radius: f64) -> Result<Self, BorderError> {
        let features = match text.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(f) => vec![f],
            GeoJson::Geometry(g) => vec![Feature {
                bbox: None,
                geometry: Some(g),
                id: None,
                properties: None,
                foreign_members: None,
            }],
        };

        let mut overlay = BorderOverlay {
            radius,
            features: features.len(),
            ..BorderOverlay::default()
        };
        for (index, feature) in features.iter().enumerate() {
            let name = feature_name(feature);
            let before = overlay.rings.len();
            if let Some(geometry) = &feature.geometry {
                collect_rings(geometry, index, &name, radius, &mut overlay.rings)?;
            }
            if overlay.rings.len() == before {
                overlay.skipped += 1;
            }
        }
        tracing::debug!(
            features = overlay.features,
            rings = overlay.rings.len(),
            skipped = overlay.skipped,
            "parsed border overlay"
        );
        Ok(overlay)
    }

    pub fn point_count(&self) -> usize {
        self.rings.iter().map(|r| r.points.len()).sum()
    }
}

fn feature_name(feature: &Feature) -> Option<String> {
    let props = feature.properties.as_ref()?;
    ["name", "NAME", "continent", "CONTINENT"]
        .iter()
        .find_map(|k| props.get(*k).and_then(|v| v.as_str()))
        .map(str::to_owned)
}

fn collect_rings(
    geometry: &Geometry,
    feature: usize,
    name: &Option<String>,
    radius: f64,
    out: &mut Vec<BorderRing>,
) -> Result<(), BorderError> {
    match &geometry.value {
        Value::Polygon(rings) => push_polygon(rings, feature, name, radius, out),
        Value::MultiPolygon(polys) => {
            for rings in polys {
                push_polygon(rings, feature, name, radius, out)?;
            }
            Ok(())
        }
        Value::GeometryCollection(geoms) => {
            for g in geoms {
                collect_rings(g, feature, name, radius, out)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn push_polygon(
    rings: &PolygonType,
    feature: usize,
    name: &Option<String>,
    radius: f64,
    out: &mut Vec<BorderRing>,
) -> Result<(), BorderError> {
    for ring in rings {
        // Fewer than three distinct vertices cannot outline anything.
        if ring.len() < 3 {
            continue;
        }
        let mut points = Vec::with_capacity(ring.len() + 1);
        for pos in ring {
            let [lon, lat] = match pos.as_slice() {
                [lon, lat, ..] => [*lon, *lat],
                _ => {
                    return Err(BorderError::InvalidPosition {
                        feature,
                        reason: format!("position has {} coordinates", pos.len()),
                    });
                }
            };
            if !lon.is_finite() || !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(BorderError::InvalidPosition {
                    feature,
                    reason: format!("out of range position ({lon}, {lat})"),
                });
            }
            points.push(geo_to_sphere(lat, lon, radius));
        }
        if points.first() != points.last()
            && let Some(first) = points.first().copied()
        {
            points.push(first);
        }
        out.push(BorderRing {
            feature,
            name: name.clone(),
            points,
        });
    }
    Ok(())
}
