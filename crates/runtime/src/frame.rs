use std::time::Duration;

use foundation::time::Time;

/// Deterministic frame metadata.
///
/// The render loop stamps each animation step with one of these; anything
/// that needs "once per frame" behavior compares frame times, never wall
/// clock reads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed delta time (seconds).
    pub dt_s: f64,
    /// Time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }
}

/// Default spacing for per-frame projection work (~60 Hz).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Rate limiter keyed on frame timestamps.
///
/// `should_run` returns true at most once per `interval`; the first call
/// always runs.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval: Duration,
    last_run: Option<Time>,
}

impl Default for FrameThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl FrameThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn should_run(&mut self, now: Time) -> bool {
        let due = match self.last_run {
            None => true,
            // Clocks that step backwards restart the window.
            Some(last) if now < last => true,
            Some(last) => now.since(last) >= self.interval.as_secs_f64(),
        };
        if due {
            self.last_run = Some(now);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last_run = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, FrameThrottle};
    use foundation::time::Time;
    use std::time::Duration;

    #[test]
    fn frame_time_is_deterministic() {
        let a = Frame::new(10, 1.0 / 60.0);
        let b = Frame::new(10, 1.0 / 60.0);
        assert_eq!(a, b);
        assert_eq!(a.time, Time(10.0 / 60.0));
    }

    #[test]
    fn next_advances_index_and_time() {
        let f1 = Frame::new(0, 0.5).next();
        assert_eq!(f1.index, 1);
        assert_eq!(f1.time, Time(0.5));
    }

    #[test]
    fn throttle_runs_at_most_once_per_interval() {
        let mut t = FrameThrottle::new(Duration::from_millis(16));
        assert!(t.should_run(Time(0.0)));
        assert!(!t.should_run(Time(0.005)));
        assert!(!t.should_run(Time(0.015)));
        assert!(t.should_run(Time(0.016)));
        assert!(!t.should_run(Time(0.020)));
    }

    #[test]
    fn throttle_driven_by_frames_skips_every_other_120hz_frame() {
        let mut t = FrameThrottle::default();
        let mut f = Frame::new(0, 1.0 / 120.0);
        let mut runs = 0;
        for _ in 0..120 {
            if t.should_run(f.time) {
                runs += 1;
            }
            f = f.next();
        }
        // 1 s of 120 Hz frames, throttled to >= 16 ms spacing.
        assert!((55..=62).contains(&runs), "runs = {runs}");
    }

    #[test]
    fn backwards_clock_restarts_window() {
        let mut t = FrameThrottle::default();
        assert!(t.should_run(Time(5.0)));
        assert!(t.should_run(Time(1.0)));
        assert!(!t.should_run(Time(1.001)));
    }
}
