//! Historical event domain model: events, their classification from backend
//! tags, the user's filter state and timeline playback.

pub mod event;
pub mod filter;
pub mod tags;
pub mod timeline;

pub use event::*;
pub use filter::*;
pub use tags::*;
pub use timeline::*;
