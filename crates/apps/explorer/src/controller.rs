//! Interaction controller: owns the filter, decides when to query, and keeps
//! the marker scene in step with the latest applied result.
//!
//! The controller does no I/O. Operations that need data return a
//! [`PendingQuery`]; the host runs it against a [`ClusterSource`] and hands
//! the outcome back through [`InteractionController::apply`]. Responses are
//! fenced by sequence number, so a slow early request never overwrites a
//! newer result.

use std::collections::BTreeMap;
use std::sync::Arc;

use catalog::{EventType, FilterState, HistoricalEvent, TimelinePlayer, WarPeriod};
use foundation::Viewport;
use foundation::math::{CameraPose, ScreenView, camera_pose_to_viewport};
use foundation::time::Time;
use runtime::{EventBus, Frame, ViewportGate};
use scene::{HoverChange, MarkerScene, Ray, ScreenMarker};
use streaming::{
    AnnotatedCluster, CacheStats, ClientError, ClusterSource, EventQueryCache, QueryKey,
    RequestSeq, RequestSequencer, flatten_events,
};
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;

/// Notifications for the detail and filter panels.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    EventSelected(Arc<HistoricalEvent>),
    SelectionCleared,
    ViewportChanged(Viewport),
    EventsUpdated { count: usize },
    FetchFailed { message: String },
    YearChanged(Option<i32>),
}

/// A query the host must run.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingQuery {
    pub seq: RequestSeq,
    pub filter: FilterState,
}

impl PendingQuery {
    /// Run against `source`, returning the pair `apply` expects.
    pub async fn run(
        self,
        source: &dyn ClusterSource,
    ) -> (RequestSeq, Result<Vec<AnnotatedCluster>, ClientError>) {
        let result = source.fetch(&self.filter).await;
        (self.seq, result)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { events: usize },
    /// A newer result was already applied.
    Stale,
    /// The controller was torn down.
    Unmounted,
    /// The fetch failed; the previous events stay in place.
    Failed,
}

type Clusters = Arc<Vec<AnnotatedCluster>>;

pub struct InteractionController {
    config: ControllerConfig,
    filter: FilterState,
    gate: ViewportGate,
    cache: EventQueryCache<Clusters>,
    sequencer: RequestSequencer,
    in_flight: BTreeMap<RequestSeq, QueryKey>,
    scene: MarkerScene,
    timeline: TimelinePlayer,
    clusters: Clusters,
    events: Vec<HistoricalEvent>,
    last_good_viewport: Viewport,
    last_error: Option<String>,
    mounted: bool,
    frame: Frame,
    bus: EventBus<ControllerEvent>,
}

impl InteractionController {
    pub fn new(config: ControllerConfig, filter: FilterState) -> Self {
        let mut timeline = TimelinePlayer::new(config.timeline.clone());
        if let Some(year) = filter.year {
            timeline.set_year(year);
        }
        Self {
            gate: ViewportGate::new(config.gate),
            cache: EventQueryCache::new(config.cache),
            sequencer: RequestSequencer::new(),
            in_flight: BTreeMap::new(),
            scene: MarkerScene::new(config.marker),
            timeline,
            clusters: Arc::new(Vec::new()),
            events: Vec::new(),
            last_good_viewport: filter.viewport,
            last_error: None,
            mounted: true,
            frame: Frame::new(0, 1.0 / 60.0),
            bus: EventBus::new(),
            filter,
            config,
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Events from the last applied result, in cluster order.
    pub fn events(&self) -> &[HistoricalEvent] {
        &self.events
    }

    pub fn clusters(&self) -> &[AnnotatedCluster] {
        &self.clusters
    }

    pub fn scene(&self) -> &MarkerScene {
        &self.scene
    }

    pub fn timeline(&self) -> &TimelinePlayer {
        &self.timeline
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn has_pending_viewport(&self) -> bool {
        self.gate.is_pending()
    }

    /// First query for the initial filter. Primes the gate so the first
    /// camera report within threshold does not query again.
    pub fn initial_query(&mut self) -> Option<PendingQuery> {
        if !self.mounted {
            return None;
        }
        self.gate.prime(self.filter.viewport);
        self.last_good_viewport = self.filter.viewport;
        self.query()
    }

    /// Report a camera move. The viewport is debounced; call `tick` to
    /// pick up the settled value.
    pub fn on_camera_change(&mut self, pose: CameraPose, now: Time) {
        if !self.mounted {
            return;
        }
        let pose = self.clamped(pose);
        let viewport = match camera_pose_to_viewport(&pose) {
            Ok(v) => {
                self.last_good_viewport = v;
                v
            }
            Err(e) => {
                warn!(error = %e, "camera pose unusable; keeping last viewport");
                self.last_good_viewport
            }
        };
        self.gate.offer(viewport, now);
    }

    fn clamped(&self, mut pose: CameraPose) -> CameraPose {
        let distance = pose.position.length();
        let (min, max) = (
            self.config.min_camera_distance,
            self.config.max_camera_distance,
        );
        if distance.is_finite() && distance > 0.0 {
            let target = distance.clamp(min, max.max(min));
            if target != distance {
                pose.position = pose.position.scale(target / distance);
            }
        }
        pose
    }

    /// Advance the controller clock: settles debounced viewports and steps
    /// timeline playback. Returns at most one query covering both.
    pub fn tick(&mut self, now: Time) -> Option<PendingQuery> {
        if !self.mounted {
            return None;
        }
        self.frame = self.frame.next();
        let mut changed = false;

        if let Some(viewport) = self.gate.poll(now) {
            self.filter.viewport = viewport;
            self.emit(ControllerEvent::ViewportChanged(viewport));
            changed = true;
        }
        if let Some(year) = self.timeline.tick(now) {
            self.filter.year = Some(year);
            self.emit(ControllerEvent::YearChanged(Some(year)));
            changed = true;
        }

        if changed { self.query() } else { None }
    }

    /// Serve the current filter from cache, or hand back a query to run.
    fn query(&mut self) -> Option<PendingQuery> {
        let key = QueryKey::new(&self.filter);
        let seq = self.sequencer.issue();
        if let Some(hit) = self.cache.get(&key) {
            // Fence out anything still in flight for older filters.
            self.sequencer.accept(seq);
            debug!(seq = seq.0, "serving query from cache");
            self.install(hit);
            return None;
        }
        self.in_flight.insert(seq, key);
        info!(seq = seq.0, tags = ?self.filter.tags(), year = ?self.filter.year, "query issued");
        Some(PendingQuery {
            seq,
            filter: self.filter.clone(),
        })
    }

    /// Hand back the outcome of a query returned earlier.
    pub fn apply(
        &mut self,
        seq: RequestSeq,
        result: Result<Vec<AnnotatedCluster>, ClientError>,
    ) -> ApplyOutcome {
        let key = self.in_flight.remove(&seq);
        if !self.mounted {
            debug!(seq = seq.0, "result after teardown ignored");
            return ApplyOutcome::Unmounted;
        }
        match result {
            Ok(clusters) => {
                // A stale result is still the right answer for its own filter.
                let clusters = Arc::new(clusters);
                if let Some(key) = key {
                    self.cache.put(key, Arc::clone(&clusters));
                }
                if !self.sequencer.accept(seq) {
                    debug!(seq = seq.0, "stale result discarded");
                    return ApplyOutcome::Stale;
                }
                self.last_error = None;
                let events = self.install(clusters);
                ApplyOutcome::Applied { events }
            }
            Err(e) => {
                if !self.sequencer.is_outstanding(seq) {
                    debug!(seq = seq.0, error = %e, "stale failure discarded");
                    return ApplyOutcome::Stale;
                }
                // Older requests are for filters that are no longer active.
                self.sequencer.accept(seq);
                warn!(seq = seq.0, error = %e, "fetch failed; keeping previous events");
                let message = e.to_string();
                self.last_error = Some(message.clone());
                self.emit(ControllerEvent::FetchFailed { message });
                ApplyOutcome::Failed
            }
        }
    }

    fn install(&mut self, clusters: Clusters) -> usize {
        self.events = flatten_events(clusters.iter());
        self.clusters = clusters;
        let report = self.scene.reconcile(&self.events);
        if report.selection_cleared {
            self.emit(ControllerEvent::SelectionCleared);
        }
        let count = self.events.len();
        self.emit(ControllerEvent::EventsUpdated { count });
        count
    }

    pub fn set_period(&mut self, period: Option<WarPeriod>) -> Option<PendingQuery> {
        if !self.mounted || self.filter.period == period {
            return None;
        }
        self.filter.period = period;
        self.query()
    }

    pub fn toggle_type(&mut self, ty: EventType) -> Option<PendingQuery> {
        if !self.mounted {
            return None;
        }
        self.filter.toggle_type(ty);
        self.query()
    }

    /// Scrub the timeline. `None` clears the year filter and stops playback.
    pub fn set_year(&mut self, year: Option<i32>) -> Option<PendingQuery> {
        if !self.mounted {
            return None;
        }
        let year = match year {
            Some(y) => Some(self.timeline.set_year(y)),
            None => {
                self.timeline.pause();
                self.timeline.clear_year();
                None
            }
        };
        if self.filter.year == year {
            return None;
        }
        self.filter.year = year;
        self.emit(ControllerEvent::YearChanged(year));
        self.query()
    }

    /// Start or stop playback. Starting without a year picks the first one.
    pub fn toggle_playback(&mut self, now: Time) -> Option<PendingQuery> {
        if !self.mounted {
            return None;
        }
        let year = self.timeline.toggle(now)?;
        self.filter.year = Some(year);
        self.emit(ControllerEvent::YearChanged(Some(year)));
        self.query()
    }

    pub fn set_zoom(&mut self, zoom: Option<f64>) -> Option<PendingQuery> {
        if !self.mounted {
            return None;
        }
        let zoom = zoom.filter(|z| z.is_finite());
        if self.filter.zoom == zoom {
            return None;
        }
        self.filter.zoom = zoom;
        self.query()
    }

    pub fn pointer_move(&mut self, ray: Ray) -> HoverChange {
        self.scene.pointer_move(ray)
    }

    pub fn pointer_leave(&mut self) -> HoverChange {
        self.scene.pointer_leave()
    }

    /// Select the marker under `ray`. A miss leaves the selection alone.
    pub fn click(&mut self, ray: Ray) -> Option<Arc<HistoricalEvent>> {
        let event = self.scene.click(ray)?;
        self.emit(ControllerEvent::EventSelected(Arc::clone(&event)));
        Some(event)
    }

    pub fn select_event(&mut self, event_id: &str) -> bool {
        if !self.scene.select(event_id) {
            return false;
        }
        if let Some(marker) = self.scene.selected() {
            let event = Arc::clone(&marker.event);
            self.emit(ControllerEvent::EventSelected(event));
        }
        true
    }

    pub fn clear_selection(&mut self) -> Option<String> {
        let cleared = self.scene.clear_selection()?;
        self.emit(ControllerEvent::SelectionCleared);
        Some(cleared)
    }

    pub fn selected_event(&self) -> Option<&Arc<HistoricalEvent>> {
        self.scene.selected().map(|m| &m.event)
    }

    /// Per-frame screen positions for overlays.
    pub fn screen_positions(&mut self, view: &ScreenView, now: Time) -> &[ScreenMarker] {
        self.scene.screen_positions(view, now)
    }

    /// Narrow point-lookup results to the active filter.
    pub fn admit_lookup(&self, events: Vec<HistoricalEvent>) -> Vec<HistoricalEvent> {
        events
            .into_iter()
            .filter(|e| self.filter.admits(e))
            .collect()
    }

    /// Drop pending viewport work and ignore every result still in flight.
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.gate.cancel();
        self.timeline.pause();
        let dropped = self.in_flight.len();
        self.in_flight.clear();
        info!(dropped, "controller torn down");
    }

    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        self.bus.drain().into_iter().map(|s| s.event).collect()
    }

    fn emit(&mut self, event: ControllerEvent) {
        self.bus.emit(self.frame, event);
    }
}
