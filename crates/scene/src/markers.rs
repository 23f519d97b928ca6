//! The live set of interactive event markers.
//!
//! Markers are rebuilt wholesale from each new event list. Hover and
//! selection are the only mutable state; selection is remembered by event id
//! so it survives a rebuild when the event is still present.

use std::collections::HashSet;
use std::sync::Arc;

use catalog::HistoricalEvent;
use foundation::bounds::Aabb3;
use foundation::math::{ScreenView, Vec3, geo_to_sphere, sphere_to_screen};
use foundation::time::Time;
use runtime::FrameThrottle;
use tracing::debug;

use crate::entity::MarkerId;
use crate::palette::{Accent, SELECTED_ACCENT, accent_for};
use crate::picking::{PickOptions, Ray, pick_nearest};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerStyle {
    /// Sphere radius the pins sit on (globe radius is 1).
    pub pin_radius: f64,
    /// Half-extent of each marker's pick box.
    pub hit_half_extent: f64,
    pub hover_scale: f64,
    pub pick: PickOptions,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            pin_radius: 1.011,
            hit_half_extent: 0.02,
            hover_scale: 1.3,
            pick: PickOptions::default(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MarkerVisual {
    Idle,
    Hovered,
    Selected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub event: Arc<HistoricalEvent>,
    pub position: Vec3,
    pub bounds: Aabb3,
    pub accent: Accent,
    pub selected: bool,
    pub hovered: bool,
}

impl Marker {
    /// Selected styling wins when a marker is both selected and hovered.
    pub fn visual(&self) -> MarkerVisual {
        if self.selected {
            MarkerVisual::Selected
        } else if self.hovered {
            MarkerVisual::Hovered
        } else {
            MarkerVisual::Idle
        }
    }

    pub fn display_accent(&self) -> Accent {
        match self.visual() {
            MarkerVisual::Selected => SELECTED_ACCENT,
            MarkerVisual::Hovered | MarkerVisual::Idle => self.accent,
        }
    }

    pub fn display_scale(&self, style: &MarkerStyle) -> f64 {
        if self.hovered { style.hover_scale } else { 1.0 }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    pub removed: usize,
    pub created: usize,
    /// A selection existed before and its event is gone from the new list.
    pub selection_cleared: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct HoverChange {
    pub previous: Option<MarkerId>,
    pub current: Option<MarkerId>,
}

impl HoverChange {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenMarker {
    pub marker: MarkerId,
    pub event_id: String,
    pub x: f64,
    pub y: f64,
    pub visible: bool,
}

#[derive(Debug, Default)]
pub struct MarkerScene {
    style: MarkerStyle,
    generation: u32,
    markers: Vec<Marker>,
    selected_event: Option<String>,
    hovered: Option<MarkerId>,
    throttle: FrameThrottle,
    screen: Vec<ScreenMarker>,
}

impl MarkerScene {
    pub fn new(style: MarkerStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn style(&self) -> &MarkerStyle {
        &self.style
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Resolve a handle from the current generation.
    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        if id.generation() != self.generation {
            return None;
        }
        self.markers.get(id.index() as usize)
    }

    pub fn marker_for_event(&self, event_id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.event.id == event_id)
    }

    /// Replace every marker with one per event (first occurrence of an id wins).
    ///
    /// The new set is built completely before it replaces the old one.
    pub fn reconcile(&mut self, events: &[HistoricalEvent]) -> ReconcileReport {
        let generation = self.generation.wrapping_add(1);
        let mut seen = HashSet::new();
        let mut next = Vec::with_capacity(events.len());
        for event in events {
            if !seen.insert(event.id.as_str()) {
                continue;
            }
            let id = MarkerId::new(next.len() as u32, generation);
            let position = geo_to_sphere(
                event.location.lat,
                event.location.lon,
                self.style.pin_radius,
            );
            next.push(Marker {
                id,
                position,
                bounds: Aabb3::around(position, self.style.hit_half_extent),
                accent: accent_for(event.event_type),
                selected: self.selected_event.as_deref() == Some(event.id.as_str()),
                hovered: false,
                event: Arc::new(event.clone()),
            });
        }

        let selection_cleared =
            self.selected_event.is_some() && !next.iter().any(|m: &Marker| m.selected);
        if selection_cleared {
            self.selected_event = None;
        }

        let report = ReconcileReport {
            removed: self.markers.len(),
            created: next.len(),
            selection_cleared,
        };
        self.markers = next;
        self.generation = generation;
        self.hovered = None;
        self.screen.clear();
        self.throttle.reset();
        debug!(
            generation,
            created = report.created,
            removed = report.removed,
            selection_cleared,
            "markers reconciled"
        );
        report
    }

    fn pick(&self, ray: Ray) -> Option<MarkerId> {
        pick_nearest(
            self.markers.iter().map(|m| (m.id, &m.bounds)),
            ray,
            self.style.pick,
        )
        .map(|hit| hit.marker)
    }

    fn set_hovered(&mut self, current: Option<MarkerId>) -> HoverChange {
        let previous = self.hovered;
        if previous != current {
            if let Some(m) = previous.and_then(|id| self.markers.get_mut(id.index() as usize)) {
                m.hovered = false;
            }
            if let Some(m) = current.and_then(|id| self.markers.get_mut(id.index() as usize)) {
                m.hovered = true;
            }
            self.hovered = current;
        }
        HoverChange { previous, current }
    }

    /// Hit-test the pointer ray; the nearest marker (if any) becomes hovered.
    pub fn pointer_move(&mut self, ray: Ray) -> HoverChange {
        let hit = self.pick(ray);
        self.set_hovered(hit)
    }

    /// Pointer left the scene.
    pub fn pointer_leave(&mut self) -> HoverChange {
        self.set_hovered(None)
    }

    /// Select the marker under the pointer. Misses leave the selection alone.
    pub fn click(&mut self, ray: Ray) -> Option<Arc<HistoricalEvent>> {
        let id = self.pick(ray)?;
        let event = self.marker(id)?.event.clone();
        self.select(&event.id);
        Some(event)
    }

    /// Select the marker bound to `event_id`. Returns false if it is not in the scene.
    pub fn select(&mut self, event_id: &str) -> bool {
        if self.marker_for_event(event_id).is_none() {
            return false;
        }
        for m in &mut self.markers {
            m.selected = m.event.id == event_id;
        }
        self.selected_event = Some(event_id.to_string());
        true
    }

    pub fn clear_selection(&mut self) -> Option<String> {
        for m in &mut self.markers {
            m.selected = false;
        }
        self.selected_event.take()
    }

    pub fn selected(&self) -> Option<&Marker> {
        let id = self.selected_event.as_deref()?;
        self.marker_for_event(id)
    }

    pub fn hovered(&self) -> Option<&Marker> {
        self.hovered.and_then(|id| self.marker(id))
    }

    /// Screen positions for overlays, recomputed at most once per frame interval.
    pub fn screen_positions(&mut self, view: &ScreenView, now: Time) -> &[ScreenMarker] {
        if self.throttle.should_run(now) {
            self.screen = self
                .markers
                .iter()
                .map(|m| {
                    let p = sphere_to_screen(m.position, view);
                    ScreenMarker {
                        marker: m.id,
                        event_id: m.event.id.clone(),
                        x: p.x,
                        y: p.y,
                        visible: p.visible,
                    }
                })
                .collect();
        }
        &self.screen
    }
}
