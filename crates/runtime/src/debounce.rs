//! Trailing-edge debouncing over a caller-supplied timebase.

use std::time::Duration;

use foundation::time::Time;

/// Timer-owning debouncer.
///
/// Each `schedule` replaces the pending value and restarts the quiet
/// interval; `poll` releases the trailing value once `interval` has elapsed
/// with no further input. Nothing fires on its own, so dropping or
/// cancelling the debouncer can never deliver into a disposed owner.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    interval: Duration,
    pending: Option<(T, Time)>,
}

impl<T> Debouncer<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn schedule(&mut self, value: T, now: Time) {
        self.pending = Some((value, now.after(self.interval)));
    }

    /// Take the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Time) -> Option<T> {
        match &self.pending {
            Some((_, due)) if now >= *due => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    /// Take the pending value regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }

    /// Drop the pending value without delivering it.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Time> {
        self.pending.as_ref().map(|(_, due)| *due)
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use foundation::time::Time;
    use std::time::Duration;

    #[test]
    fn burst_collapses_to_trailing_value() {
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.schedule(1, Time(0.0));
        d.schedule(2, Time(0.1));
        d.schedule(3, Time(0.2));
        assert_eq!(d.poll(Time(0.45)), None);
        assert_eq!(d.poll(Time(0.5)), Some(3));
        assert!(!d.is_pending());
        assert_eq!(d.poll(Time(10.0)), None);
    }

    #[test]
    fn flush_ignores_deadline() {
        let mut d = Debouncer::new(Duration::from_secs(5));
        d.schedule("a", Time(0.0));
        assert_eq!(d.flush(), Some("a"));
        assert_eq!(d.flush(), None);
    }

    #[test]
    fn cancel_drops_without_delivering() {
        let mut d = Debouncer::new(Duration::from_millis(50));
        d.schedule(7, Time(1.0));
        assert_eq!(d.deadline(), Some(Time(1.05)));
        assert!(d.cancel());
        assert!(!d.cancel());
        assert_eq!(d.poll(Time(2.0)), None);
    }
}
