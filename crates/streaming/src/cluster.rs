//! Clusters and the geometry derived from them for one query.

use std::collections::BTreeSet;
use std::f64::consts::PI;

use catalog::HistoricalEvent;
use foundation::time::parse_iso_datetime;
use foundation::{DateRange, GeoBounds, GeoCoordinate, Viewport};

use crate::protocol::RawCluster;

/// Reference multiplier from event density to on-screen radius.
pub const DEFAULT_RADIUS_SCALE: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub id: String,
    /// Back-reference only; the parent is not owned or resolved.
    pub parent_id: Option<String>,
    pub centroid: GeoCoordinate,
    pub centroid_time_days: f64,
    pub level: u32,
    /// Distinct ids in first-seen order.
    pub event_ids: Vec<String>,
    /// `None` unless all four edges were present.
    pub bounds: Option<GeoBounds>,
    pub date_range: DateRange,
    pub events: Vec<HistoricalEvent>,
}

impl Cluster {
    pub fn from_raw(raw: RawCluster) -> Result<Cluster, String> {
        let id = raw.cluster_id.to_string();
        if !raw.centroid_lat.is_finite() || !raw.centroid_lon.is_finite() {
            return Err(format!("cluster {id}: non-finite centroid"));
        }

        let mut seen = BTreeSet::new();
        let event_ids = raw
            .event_ids
            .iter()
            .map(ToString::to_string)
            .filter(|e| seen.insert(e.clone()))
            .collect();

        let bounds = match (raw.min_lat, raw.max_lat, raw.min_lon, raw.max_lon) {
            (Some(a), Some(b), Some(c), Some(d)) => Some(GeoBounds::new(a, b, c, d)),
            _ => None,
        };

        let parse_date = |field: &str, v: Option<&String>| match v {
            None => Ok(None),
            Some(s) => parse_iso_datetime(s)
                .map(Some)
                .ok_or_else(|| format!("cluster {id}: unparseable {field} {s:?}")),
        };
        let date_range = DateRange::new(
            parse_date("min_date", raw.min_date.as_ref())?,
            parse_date("max_date", raw.max_date.as_ref())?,
        );

        let events = raw
            .events
            .into_iter()
            .map(|e| e.into_event())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Cluster {
            parent_id: raw.parent_cluster_id.map(|p| p.to_string()),
            centroid: GeoCoordinate::new(raw.centroid_lat, raw.centroid_lon),
            centroid_time_days: raw.centroid_time_days.unwrap_or(0.0),
            level: raw.level,
            event_ids,
            bounds,
            date_range,
            events,
            id,
        })
    }

    pub fn point_count(&self) -> usize {
        self.event_ids.len()
    }

    /// Derived geometry against the viewport the cluster was requested for.
    pub fn geometry(&self, viewport: &Viewport, radius_scale: f64) -> ClusterGeometry {
        let size = ClusterGeometry::bounds(self.bounds.as_ref());
        ClusterGeometry {
            point_count: self.point_count(),
            radius: ClusterGeometry::radius(self.point_count(), size.area, radius_scale),
            time_span_days: ClusterGeometry::time_span_days(&self.date_range),
            fully_visible: ClusterGeometry::is_fully_visible(self.bounds.as_ref(), viewport),
            partially_visible: ClusterGeometry::is_partially_visible(
                self.bounds.as_ref(),
                viewport,
            ),
            size,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct BoundsSize {
    pub width: f64,
    pub height: f64,
    pub area: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClusterGeometry {
    pub point_count: usize,
    pub size: BoundsSize,
    pub radius: f64,
    pub time_span_days: i64,
    pub fully_visible: bool,
    pub partially_visible: bool,
}

impl ClusterGeometry {
    /// Width/height/area of the bounds; all zero when bounds are missing.
    pub fn bounds(bounds: Option<&GeoBounds>) -> BoundsSize {
        bounds.map_or_else(BoundsSize::default, |b| BoundsSize {
            width: b.width(),
            height: b.height(),
            area: b.area(),
        })
    }

    pub fn radius(point_count: usize, area: f64, scale: f64) -> f64 {
        let n = point_count as f64;
        if area > 0.0 {
            (n * area / PI).sqrt() * scale
        } else {
            n.sqrt() * scale
        }
    }

    pub fn time_span_days(range: &DateRange) -> i64 {
        range.span_days()
    }

    pub fn is_fully_visible(bounds: Option<&GeoBounds>, viewport: &Viewport) -> bool {
        bounds.is_some_and(|b| b.is_inside(viewport))
    }

    pub fn is_partially_visible(bounds: Option<&GeoBounds>, viewport: &Viewport) -> bool {
        bounds.is_some_and(|b| b.overlaps(viewport))
    }
}

/// A cluster together with the geometry computed for the query that fetched it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedCluster {
    pub cluster: Cluster,
    pub geometry: ClusterGeometry,
}

/// Every event carried by `clusters`, de-duplicated by id (first occurrence wins).
pub fn flatten_events<'a>(
    clusters: impl IntoIterator<Item = &'a AnnotatedCluster>,
) -> Vec<HistoricalEvent> {
    let mut seen = BTreeSet::new();
    clusters
        .into_iter()
        .flat_map(|c| c.cluster.events.iter())
        .filter(|e| seen.insert(e.id.as_str()))
        .cloned()
        .collect()
}
