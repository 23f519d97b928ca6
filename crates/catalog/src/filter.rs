use std::collections::BTreeSet;

use chrono::Datelike;
use foundation::Viewport;

use crate::event::{EventType, HistoricalEvent, WarPeriod};

/// Snapshot of the active filters.
///
/// The interaction controller owns the only mutable copy; everything else
/// receives clones.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub period: Option<WarPeriod>,
    pub types: BTreeSet<EventType>,
    pub year: Option<i32>,
    pub viewport: Viewport,
    pub zoom: Option<f64>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            period: None,
            types: BTreeSet::new(),
            year: None,
            viewport: Viewport::world(),
            zoom: None,
        }
    }
}

impl FilterState {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn with_period(mut self, period: Option<WarPeriod>) -> Self {
        self.period = period;
        self
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = EventType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_zoom(mut self, zoom: Option<f64>) -> Self {
        self.zoom = zoom;
        self
    }

    /// Adds `ty` if absent, removes it otherwise. Returns whether it is now active.
    pub fn toggle_type(&mut self, ty: EventType) -> bool {
        if self.types.remove(&ty) {
            false
        } else {
            self.types.insert(ty);
            true
        }
    }

    /// Period and types collapsed into the backend's single tag list.
    pub fn tags(&self) -> Vec<String> {
        self.period
            .map(|p| p.as_str().to_string())
            .into_iter()
            .chain(self.types.iter().map(|t| t.as_str().to_string()))
            .collect()
    }

    /// Local check of the semantic filters (period, types, year).
    ///
    /// The viewport is not consulted; it only sizes backend queries.
    pub fn admits(&self, event: &HistoricalEvent) -> bool {
        if self.period.is_some_and(|p| p != event.period) {
            return false;
        }
        if !self.types.is_empty() && !self.types.contains(&event.event_type) {
            return false;
        }
        if self.year.is_some_and(|y| y != event.date.year()) {
            return false;
        }
        true
    }
}
