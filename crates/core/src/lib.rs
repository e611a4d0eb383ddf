//! Muster Core - Core library for the muster session launcher
//!
//! This crate provides:
//! - Project descriptions and the JSON project store
//! - Tmux command execution, real or recorded
//! - Session and window construction

pub mod config;
pub mod error;
pub mod tmux;

// Re-export commonly used types at crate root
pub use config::{Layout, PaneDescription, ProjectDescription, ProjectStore, WindowDescription};
pub use error::{Error, ErrorKind, Result};
