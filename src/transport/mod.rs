//! Bus transports and link supervision

pub mod link;
pub mod supervisor;

pub use link::{BusLink, FramedLink};
