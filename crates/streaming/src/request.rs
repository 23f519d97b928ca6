/// Monotonic tag attached to every outbound query.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestSeq(pub u64);

/// Orders responses by the order their requests were issued.
///
/// Responses may resolve in any order; `accept` lets through only those
/// newer than the last one applied, so a slow early request can never
/// overwrite data from a later one.
#[derive(Debug, Default, Clone)]
pub struct RequestSequencer {
    next: u64,
    last_applied: Option<RequestSeq>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestSeq {
        self.next += 1;
        RequestSeq(self.next)
    }

    /// Most recently issued sequence number.
    pub fn latest(&self) -> Option<RequestSeq> {
        (self.next > 0).then_some(RequestSeq(self.next))
    }

    pub fn last_applied(&self) -> Option<RequestSeq> {
        self.last_applied
    }

    /// Returns true (and records `seq` as applied) if `seq` is newer than
    /// everything applied so far.
    pub fn accept(&mut self, seq: RequestSeq) -> bool {
        if seq.0 == 0 || seq.0 > self.next {
            return false;
        }
        if self.last_applied.is_some_and(|last| seq <= last) {
            return false;
        }
        self.last_applied = Some(seq);
        true
    }

    pub fn is_outstanding(&self, seq: RequestSeq) -> bool {
        self.last_applied.is_none_or(|last| seq > last) && seq.0 <= self.next && seq.0 > 0
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestSeq, RequestSequencer};

    #[test]
    fn issue_is_monotonic() {
        let mut s = RequestSequencer::new();
        assert_eq!(s.latest(), None);
        let a = s.issue();
        let b = s.issue();
        assert!(b > a);
        assert_eq!(s.latest(), Some(b));
    }

    #[test]
    fn late_response_from_an_earlier_request_is_discarded() {
        let mut s = RequestSequencer::new();
        let first = s.issue();
        let second = s.issue();
        assert!(s.accept(second));
        assert!(!s.accept(first));
        assert!(!s.accept(second));
        assert_eq!(s.last_applied(), Some(second));
    }

    #[test]
    fn in_order_responses_all_apply() {
        let mut s = RequestSequencer::new();
        let a = s.issue();
        let b = s.issue();
        assert!(s.is_outstanding(a));
        assert!(s.accept(a));
        assert!(!s.is_outstanding(a));
        assert!(s.accept(b));
    }

    #[test]
    fn unknown_sequence_numbers_are_rejected() {
        let mut s = RequestSequencer::new();
        s.issue();
        assert!(!s.accept(RequestSeq(0)));
        assert!(!s.accept(RequestSeq(9)));
    }
}
