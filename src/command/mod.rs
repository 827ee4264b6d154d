//! Command handling: grammar and request tracking

pub mod parser;
pub mod tracker;

pub use parser::{CommandAction, CommandError};
pub use tracker::RequestTracker;
