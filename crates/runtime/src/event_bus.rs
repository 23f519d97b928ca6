use crate::frame::Frame;

/// An emitted item stamped with the frame it was raised in.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<E> {
    pub frame_index: u64,
    pub event: E,
}

/// Ordered outbox between a state owner and its host.
///
/// Emitting never calls back into the host; the host drains on its own
/// schedule, so a reconciliation pass can raise events without re-entrancy.
#[derive(Debug)]
pub struct EventBus<E> {
    events: Vec<Stamped<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, frame: Frame, event: E) {
        self.events.push(Stamped {
            frame_index: frame.index,
            event,
        });
    }

    pub fn events(&self) -> &[Stamped<E>] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Stamped<E>> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use crate::frame::Frame;

    #[test]
    fn records_events_with_frame_index() {
        let mut bus = EventBus::new();
        bus.emit(Frame::new(2, 0.1), "selected");
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].frame_index, 2);
        assert_eq!(bus.events()[0].event, "selected");
    }

    #[test]
    fn drain_preserves_order_and_clears() {
        let mut bus = EventBus::new();
        bus.emit(Frame::new(0, 1.0), 1);
        bus.emit(Frame::new(1, 1.0), 2);
        let drained: Vec<i32> = bus.drain().into_iter().map(|s| s.event).collect();
        assert_eq!(drained, vec![1, 2]);
        assert!(bus.is_empty());
    }
}
