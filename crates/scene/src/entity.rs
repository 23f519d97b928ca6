use foundation::handles::Handle;

/// Marker handle. The generation advances on every scene rebuild, so a
/// handle held across a reconciliation pass no longer resolves.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub Handle);

impl MarkerId {
    pub fn new(index: u32, generation: u32) -> Self {
        MarkerId(Handle::new(index, generation))
    }

    pub fn index(&self) -> u32 {
        self.0.index()
    }

    pub fn generation(&self) -> u32 {
        self.0.generation()
    }
}
