//! Viewport change gating.
//!
//! Camera motion produces a viewport per frame; queries should only follow
//! when the view has settled and moved far enough to matter.

use std::time::Duration;

use foundation::Viewport;
use foundation::time::Time;
use tracing::{debug, trace};

use crate::debounce::Debouncer;

pub const DEFAULT_THRESHOLD_DEG: f64 = 5.0;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GateConfig {
    /// An edge must move strictly more than this many degrees to count.
    pub threshold_deg: f64,
    pub debounce: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold_deg: DEFAULT_THRESHOLD_DEG,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Debounced, threshold-filtered viewport stream.
#[derive(Debug, Clone)]
pub struct ViewportGate {
    config: GateConfig,
    last: Option<Viewport>,
    pending: Debouncer<Viewport>,
    emitted: u64,
    suppressed: u64,
}

impl Default for ViewportGate {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}

impl ViewportGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            last: None,
            pending: Debouncer::new(config.debounce),
            emitted: 0,
            suppressed: 0,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Last viewport that went downstream.
    pub fn last(&self) -> Option<&Viewport> {
        self.last.as_ref()
    }

    /// Record `viewport` as already delivered (e.g. by an initial query).
    pub fn prime(&mut self, viewport: Viewport) {
        self.last = Some(viewport);
    }

    /// Feed a raw camera-derived viewport. Non-finite input is dropped.
    pub fn offer(&mut self, viewport: Viewport, now: Time) {
        if !viewport.is_finite() {
            debug!(?viewport, "dropping non-finite viewport");
            return;
        }
        self.pending.schedule(viewport, now);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Release the settled viewport if it is a significant change.
    pub fn poll(&mut self, now: Time) -> Option<Viewport> {
        let candidate = self.pending.poll(now)?;
        self.admit(candidate)
    }

    /// Settle immediately, skipping the remaining quiet interval.
    pub fn flush(&mut self) -> Option<Viewport> {
        let candidate = self.pending.flush()?;
        self.admit(candidate)
    }

    /// Drop pending input without emitting.
    pub fn cancel(&mut self) {
        if self.pending.cancel() {
            debug!("viewport gate cancelled with pending input");
        }
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub fn is_significant(&self, viewport: &Viewport) -> bool {
        match &self.last {
            None => true,
            Some(last) => last.max_edge_delta(viewport) > self.config.threshold_deg,
        }
    }

    fn admit(&mut self, viewport: Viewport) -> Option<Viewport> {
        if !self.is_significant(&viewport) {
            self.suppressed += 1;
            trace!(?viewport, "viewport change below threshold");
            return None;
        }
        debug!(?viewport, "viewport change accepted");
        self.last = Some(viewport);
        self.emitted += 1;
        Some(viewport)
    }
}
