//! Lipsyncer Common Utilities
//!
//! Shared infrastructure for all Lipsyncer crates:
//! - Error types and result aliases
//! - Frame-rate resolution and seconds-to-frame conversion
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod framerate;
pub mod logging;

pub use config::*;
pub use error::*;
pub use framerate::*;
