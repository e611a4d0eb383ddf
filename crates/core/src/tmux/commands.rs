//! Tmux command strings
//!
//! Each function renders one tmux command line, without the executable
//! name. The executor splits these with shell-word rules, so every value
//! that comes from a project document is shell-quoted here before it is
//! interpolated.

use std::fmt;

use shell_words::quote;

use crate::config::Layout;

/// Keystroke sent after each pane command
pub const ENTER_KEY: &str = "C-m";

/// Leading text of the existence probe
pub const PROBE_PREFIX: &str = "start-server; has-session";

/// Environment variable tmux sets inside a client
pub const TMUX_ENV: &str = "TMUX";

/// Index of the window tmux creates along with a session
pub const FIRST_WINDOW: usize = 1;

// =============================================================================
// Targets
// =============================================================================

/// A window addressed as `session:index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowTarget<'a> {
    pub session: &'a str,
    pub index: usize,
}

impl<'a> WindowTarget<'a> {
    pub fn new(session: &'a str, index: usize) -> Self {
        Self { session, index }
    }

    /// The pane at a 1-based position in this window
    pub fn pane(&self, pane: usize) -> String {
        format!("{}.{}", self, pane)
    }
}

impl fmt::Display for WindowTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.session, self.index)
    }
}

// =============================================================================
// Session Commands
// =============================================================================

/// Start the server if needed, then ask whether the session exists
pub fn has_session(name: &str) -> String {
    format!("{} -t {}", PROBE_PREFIX, quote(name))
}

/// Whether a command line is the existence probe
pub fn is_probe(command: &str) -> bool {
    command.starts_with(PROBE_PREFIX)
}

pub fn attach_session(name: &str) -> String {
    format!("-u attach-session -t {}", quote(name))
}

pub fn switch_client(name: &str) -> String {
    format!("-u switch-client -t {}", quote(name))
}

pub fn kill_session(name: &str) -> String {
    format!("kill-session -t {}", quote(name))
}

/// Builder for new-session command lines
#[derive(Default)]
pub struct NewSession<'a> {
    name: Option<&'a str>,
    detached: bool,
    start_dir: Option<&'a str>,
    group: Option<&'a str>,
}

impl<'a> NewSession<'a> {
    /// Create a new session builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session name
    pub fn name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    /// Start the session detached
    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }

    /// Set the starting directory
    pub fn start_directory(mut self, dir: &'a str) -> Self {
        self.start_dir = Some(dir);
        self
    }

    /// Join the session group of an existing session
    pub fn group_with(mut self, target: &'a str) -> Self {
        self.group = Some(target);
        self
    }

    /// Render the new-session command line
    pub fn build(self) -> String {
        let mut args = vec!["new-session".to_string()];

        if self.detached {
            args.push("-d".to_string());
        }

        if let Some(name) = self.name {
            args.push("-s".to_string());
            args.push(quote(name).into_owned());
        }

        if let Some(dir) = self.start_dir {
            args.push("-c".to_string());
            args.push(quote(dir).into_owned());
        }

        if let Some(target) = self.group {
            args.push("-t".to_string());
            args.push(quote(target).into_owned());
        }

        args.join(" ")
    }
}

// =============================================================================
// Window Commands
// =============================================================================

pub fn new_window(target: WindowTarget<'_>, start_dir: &str, name: &str) -> String {
    format!(
        "new-window -c {} -t {} -n {}",
        quote(start_dir),
        quote(&target.to_string()),
        quote(name)
    )
}

pub fn rename_window(target: WindowTarget<'_>, name: &str) -> String {
    format!(
        "rename-window -t {} {}",
        quote(&target.to_string()),
        quote(name)
    )
}

pub fn select_window(target: WindowTarget<'_>) -> String {
    format!("select-window -t {}", quote(&target.to_string()))
}

pub fn select_layout(target: WindowTarget<'_>, layout: Layout) -> String {
    format!(
        "select-layout -t {} {}",
        quote(&target.to_string()),
        layout
    )
}

// =============================================================================
// Pane Commands
// =============================================================================

/// Split the window's active pane, which is the most recently created one
pub fn split_window(target: WindowTarget<'_>) -> String {
    format!("split-window -t {}", quote(&target.to_string()))
}

/// Type `keys` into a pane and press Enter
pub fn send_keys(target: WindowTarget<'_>, pane: usize, keys: &str) -> String {
    format!(
        "send-keys -t {} {} {}",
        quote(&target.pane(pane)),
        quote(keys),
        ENTER_KEY
    )
}
