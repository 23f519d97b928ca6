/// Generational handle: `(index, generation)`.
///
/// A handle minted for an earlier generation never compares equal to one
/// minted later for the same slot, so stale handles can be detected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u32, u32);

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn generation(&self) -> u32 {
        self.1
    }
}

#[cfg(test)]
mod tests {
    use super::Handle;

    #[test]
    fn generations_distinguish_reused_slots() {
        let a = Handle::new(3, 0);
        let b = Handle::new(3, 1);
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert_eq!(b.generation(), 1);
    }
}
