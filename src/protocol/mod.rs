//! EMS application protocol: messages, record formats and constants

pub mod constants;
pub mod message;
pub mod records;

pub use message::EmsMessage;
