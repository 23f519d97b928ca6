//! Wire types for the clustering service.
//!
//! Outbound: `POST {base}/clusters/hierarchical` with a [`ClusterQuery`].
//! Inbound: a [`ClusterEnvelope`] whose `data` array is required; a response
//! without it, or one whose `status` is not `"success"`, is malformed rather
//! than an empty result.
//!
//! Raw types mirror the JSON exactly and are converted into domain types in
//! one place (`into_event`, `Cluster::from_raw`) so validation errors carry a
//! single reason string.

use std::fmt;

use catalog::{FilterState, HistoricalEvent, classify_tags, split_tags};
use foundation::time::parse_iso_date;
use foundation::{GeoCoordinate, Viewport};
use serde::{Deserialize, Serialize};

/// Level requested when the caller has no zoom.
pub const DEFAULT_MAX_LEVEL: u32 = 4;

/// Map a zoom value to the deepest cluster level worth requesting.
pub fn max_level_for_zoom(zoom: Option<f64>) -> u32 {
    match zoom {
        Some(z) if z.is_finite() => (z / 5.0).floor().clamp(1.0, 3.0) as u32,
        _ => DEFAULT_MAX_LEVEL,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagFilter {
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateFilter {
    pub year: i32,
}

/// Request body for the hierarchical cluster endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_filter: Option<TagFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_filter: Option<DateFilter>,
    pub viewport: Viewport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_level: Option<f64>,
    pub max_level: u32,
}

impl ClusterQuery {
    pub fn from_filter(filter: &FilterState) -> Self {
        let tags = filter.tags();
        Self {
            tag_filter: (!tags.is_empty()).then_some(TagFilter { tags }),
            date_filter: filter.year.map(|year| DateFilter { year }),
            viewport: filter.viewport,
            zoom_level: filter.zoom.filter(|z| z.is_finite()),
            max_level: max_level_for_zoom(filter.zoom),
        }
    }
}

/// Identifiers arrive as numbers from the database and as strings from
/// hand-entered data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Num(i64),
    Text(String),
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireId::Num(n) => write!(f, "{n}"),
            WireId::Text(s) => f.write_str(s),
        }
    }
}

/// Tags as a comma-joined string or as a list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTags {
    Joined(String),
    List(Vec<String>),
}

impl Default for RawTags {
    fn default() -> Self {
        RawTags::Joined(String::new())
    }
}

impl RawTags {
    pub fn to_tags(&self) -> Vec<String> {
        match self {
            RawTags::Joined(s) => split_tags(s),
            RawTags::List(v) => v
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawEvent {
    pub id: WireId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: String,
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lon: f64,
    #[serde(default)]
    pub tags: RawTags,
    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
}

impl RawEvent {
    pub fn into_event(self) -> Result<HistoricalEvent, String> {
        let id = self.id.to_string();
        let date = parse_iso_date(&self.date)
            .ok_or_else(|| format!("event {id}: unparseable date {:?}", self.date))?;
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(format!("event {id}: non-finite coordinates"));
        }
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lon) {
            return Err(format!(
                "event {id}: coordinates out of range ({}, {})",
                self.lat, self.lon
            ));
        }
        let tags = self.tags.to_tags();
        let class = classify_tags(&tags, date);
        Ok(HistoricalEvent {
            id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            date,
            location: GeoCoordinate::new(self.lat, self.lon),
            event_type: class.event_type,
            period: class.period,
            tags,
            image_url: self.image_url.filter(|u| !u.is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCluster {
    pub cluster_id: WireId,
    #[serde(default)]
    pub parent_cluster_id: Option<WireId>,
    pub centroid_lat: f64,
    pub centroid_lon: f64,
    #[serde(default)]
    pub centroid_time_days: Option<f64>,
    pub level: u32,
    pub event_ids: Vec<WireId>,
    #[serde(default)]
    pub min_lat: Option<f64>,
    #[serde(default)]
    pub max_lat: Option<f64>,
    #[serde(default)]
    pub min_lon: Option<f64>,
    #[serde(default)]
    pub max_lon: Option<f64>,
    #[serde(default)]
    pub min_date: Option<String>,
    #[serde(default)]
    pub max_date: Option<String>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClusterEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    pub data: Vec<RawCluster>,
}

/// Point lookup answers with a bare array or with the usual envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EventsPayload {
    List(Vec<RawEvent>),
    Envelope { data: Vec<RawEvent> },
}

impl EventsPayload {
    pub fn into_raw(self) -> Vec<RawEvent> {
        match self {
            EventsPayload::List(v) | EventsPayload::Envelope { data: v } => v,
        }
    }
}
