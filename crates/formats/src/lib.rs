pub mod border;
pub mod border_cache;

pub use border::*;
pub use border_cache::*;
