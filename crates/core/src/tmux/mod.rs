//! Tmux session construction for muster projects.
//!
//! # Submodules
//!
//! - [`commands`]: Renders individual tmux command lines
//! - [`executor`]: Runs command lines, or records them for a dry run
//! - [`report`]: Per-command results and the failure policy
//! - [`session`]: Session lifecycle and the full build
//! - [`window`]: Splitting, layout, and pane commands for one window
//!
//! # Usage
//!
//! ```ignore
//! use muster_core::tmux::{Environment, SessionBuilder, SessionOptions, SystemExecutor};
//!
//! let executor = SystemExecutor::from_command_line(&project.tmux_cmd)?;
//! let options = SessionOptions::from_env(Environment::from_process());
//! let session = SessionBuilder::new(&project.name, &project, &executor, options);
//!
//! if !session.exists()? {
//!     session.create()?;
//! }
//! session.enter()?;
//! ```

pub mod commands;
mod executor;
mod report;
mod session;
mod window;

pub use executor::*;
pub use report::*;
pub use session::*;
pub use window::*;
