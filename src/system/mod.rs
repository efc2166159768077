//! System-level modules
//!
//! - logging: tracing subscriber setup

pub mod logging;

pub use logging::init_logging;
