//! Project descriptions and their on-disk store
//!
//! A project is one JSON document describing a session: its root directory
//! and the ordered windows to build, each with its panes and the commands
//! typed into them. Documents are normalized here so the builders never see
//! the alternative shapes the file format allows.

mod store;

pub use store::{ProjectStore, parse_override};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default multiplexer executable
pub const DEFAULT_TMUX_CMD: &str = "tmux";

// =============================================================================
// Project Description
// =============================================================================

/// One project document.
///
/// `socket_name`, `pre_cmd`, `win_pre_cmd` and `tmux_opts` are carried so
/// that loading and re-saving a document keeps them, but nothing in the
/// session build reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescription {
    /// Project name, also the session name
    #[serde(default)]
    pub name: String,
    /// Working directory for the session (may start with `~/`)
    #[serde(default)]
    pub root: String,
    #[serde(default)]
    pub socket_name: String,
    #[serde(default)]
    pub pre_cmd: String,
    #[serde(default)]
    pub win_pre_cmd: String,
    /// Multiplexer executable
    #[serde(default = "default_tmux_cmd")]
    pub tmux_cmd: String,
    #[serde(default)]
    pub tmux_opts: String,
    /// Windows in the order they are built
    pub windows: Vec<WindowDescription>,
}

fn default_tmux_cmd() -> String {
    DEFAULT_TMUX_CMD.to_string()
}

impl ProjectDescription {
    /// Create a description with the given windows and every other field
    /// at its default.
    pub fn new(
        name: impl Into<String>,
        root: impl Into<String>,
        windows: Vec<WindowDescription>,
    ) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            socket_name: String::new(),
            pre_cmd: String::new(),
            win_pre_cmd: String::new(),
            tmux_cmd: default_tmux_cmd(),
            tmux_opts: String::new(),
            windows,
        }
    }

    /// The document written for a freshly created project
    pub fn template(name: &str) -> Self {
        Self::new(name, default_root(name), default_windows())
    }

    /// Root directory with a leading `~/` expanded
    pub fn expanded_root(&self) -> String {
        expand_path(&self.root)
    }

    /// Check that a session can be built from this description.
    pub fn validate(&self) -> Result<()> {
        validate_session_name(&self.name)?;
        if self.windows.is_empty() {
            return Err(Error::MalformedDescription(format!(
                "project '{}' declares no windows",
                self.name
            )));
        }
        Ok(())
    }

    /// Number of multiplexer commands a full session build issues for this
    /// description, counted from the new-session call through the final
    /// select-window.
    pub fn create_command_count(&self) -> usize {
        let Some((first, rest)) = self.windows.split_first() else {
            return 0;
        };

        // new-session, rename-window, then the first window's panes
        let mut count = 2 + first.pane_command_count();

        for window in rest {
            count += 1 + window.pane_command_count();
        }

        // select-window
        count + 1
    }
}

/// Session names are used inside `session:window.pane` targets, so they
/// cannot contain the separators themselves.
pub fn validate_session_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::MalformedDescription(
            "session name is empty".to_string(),
        ));
    }
    if name.contains([':', '.']) {
        return Err(Error::MalformedDescription(format!(
            "session name '{}' may not contain ':' or '.'",
            name
        )));
    }
    Ok(())
}

/// A project's name is its session name and its file name in the store, so
/// it must also stay a single path component.
pub fn validate_project_name(name: &str) -> Result<()> {
    validate_session_name(name)?;
    if name.contains(['/', std::path::MAIN_SEPARATOR]) || std::path::Path::new(name).is_absolute()
    {
        return Err(Error::MalformedDescription(format!(
            "project name '{}' may not contain a path separator",
            name
        )));
    }
    Ok(())
}

// =============================================================================
// Windows
// =============================================================================

/// One window of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowDescription {
    /// Window label in the multiplexer
    pub name: String,
    /// Tiling layout applied once all panes exist
    #[serde(default)]
    pub layout: Layout,
    /// Panes in creation order
    #[serde(default)]
    pub panes: Vec<PaneDescription>,
}

impl WindowDescription {
    pub fn new(name: impl Into<String>, panes: Vec<PaneDescription>) -> Self {
        Self {
            name: name.into(),
            layout: Layout::default(),
            panes,
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Splits needed to reach the declared pane count
    pub fn split_count(&self) -> usize {
        self.panes.len().saturating_sub(1)
    }

    /// Total commands typed into this window's panes
    pub fn send_count(&self) -> usize {
        self.panes.iter().map(|p| p.commands().len()).sum()
    }

    /// Splits, the layout selection, and one send-keys per pane command
    fn pane_command_count(&self) -> usize {
        self.split_count() + 1 + self.send_count()
    }
}

/// Tiling layouts understood by tmux's `select-layout`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    EvenHorizontal,
    #[default]
    EvenVertical,
    MainHorizontal,
    MainVertical,
    Tiled,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::EvenHorizontal => "even-horizontal",
            Layout::EvenVertical => "even-vertical",
            Layout::MainHorizontal => "main-horizontal",
            Layout::MainVertical => "main-vertical",
            Layout::Tiled => "tiled",
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Panes
// =============================================================================

/// Commands typed into one pane, in order.
///
/// Documents may write a pane as a bare string or as a list of strings;
/// both become the same ordered list here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PaneShape", into = "PaneShape")]
pub struct PaneDescription {
    commands: Vec<String>,
}

impl PaneDescription {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl From<&str> for PaneDescription {
    fn from(command: &str) -> Self {
        Self::new([command])
    }
}

/// Wire shape of a pane
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PaneShape {
    One(String),
    Many(Vec<String>),
}

impl From<PaneShape> for PaneDescription {
    fn from(shape: PaneShape) -> Self {
        match shape {
            PaneShape::One(command) => Self {
                commands: vec![command],
            },
            PaneShape::Many(commands) => Self { commands },
        }
    }
}

impl From<PaneDescription> for PaneShape {
    fn from(pane: PaneDescription) -> Self {
        let mut commands = pane.commands;
        if commands.len() == 1 {
            PaneShape::One(commands.remove(0))
        } else {
            PaneShape::Many(commands)
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Root used when a document does not name one
pub fn default_root(name: &str) -> String {
    format!("~/{}", name)
}

/// Windows written into a new project's template
pub fn default_windows() -> Vec<WindowDescription> {
    vec![
        WindowDescription::new("editor", vec![PaneDescription::from("vim")]),
        WindowDescription::new("shell", vec![]),
    ]
}

/// Expand ~ to home directory in paths
pub fn expand_path(path: &str) -> String {
    if path == "~" {
        return dirs::home_dir()
            .map(|home| home.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
    }
    path.strip_prefix("~/")
        .and_then(|stripped| dirs::home_dir().map(|home| home.join(stripped)))
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

// =============================================================================
// Tests
// =============================================================================
