//! Viewport-keyed access to the clustering service: wire protocol, HTTP
//! client, derived cluster geometry, query cache and response ordering.

pub mod cache;
pub mod client;
pub mod cluster;
pub mod error;
pub mod protocol;
pub mod request;

pub use cache::*;
pub use client::*;
pub use cluster::*;
pub use error::*;
pub use protocol::*;
pub use request::*;
