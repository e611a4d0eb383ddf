//! Building one window of a session.

use super::{
    commands::{self, WindowTarget},
    report::Issuer,
};
use crate::{config::WindowDescription, error::Result};

/// Realizes a [`WindowDescription`] at a fixed index of an existing session
pub struct WindowBuilder<'a> {
    session: &'a str,
    root: &'a str,
    index: usize,
    window: &'a WindowDescription,
}

impl<'a> WindowBuilder<'a> {
    pub fn new(
        session: &'a str,
        root: &'a str,
        index: usize,
        window: &'a WindowDescription,
    ) -> Self {
        Self {
            session,
            root,
            index,
            window,
        }
    }

    pub fn target(&self) -> WindowTarget<'a> {
        WindowTarget::new(self.session, self.index)
    }

    /// Open a new window at this index, then lay out and populate its panes.
    pub fn create(&self, issuer: &mut Issuer<'_>) -> Result<()> {
        issuer.issue(commands::new_window(
            self.target(),
            self.root,
            &self.window.name,
        ))?;

        self.create_panes(issuer)?;
        self.run_commands(issuer)
    }

    /// Split until the window has its declared pane count, then apply the
    /// layout. The layout is applied even to a single pane.
    pub fn create_panes(&self, issuer: &mut Issuer<'_>) -> Result<()> {
        let target = self.target();

        for _ in 0..self.window.split_count() {
            issuer.issue(commands::split_window(target))?;
        }

        issuer.issue(commands::select_layout(target, self.window.layout))
    }

    /// Type each pane's commands into it, pane by pane.
    pub fn run_commands(&self, issuer: &mut Issuer<'_>) -> Result<()> {
        let target = self.target();

        for (pane_index, pane) in self.window.panes.iter().enumerate() {
            for command in pane.commands() {
                issuer.issue(commands::send_keys(target, pane_index + 1, command))?;
            }
        }

        Ok(())
    }

    /// Relabel a window that already exists at this index.
    pub fn rename(&self, issuer: &mut Issuer<'_>) -> Result<()> {
        issuer.issue(commands::rename_window(self.target(), &self.window.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Layout, PaneDescription},
        tmux::{
            executor::{Environment, RecordingExecutor},
            report::FailurePolicy,
        },
    };

    fn record(f: impl FnOnce(&mut Issuer<'_>)) -> Vec<String> {
        let recorder = RecordingExecutor::silent("tmux");
        let env = Environment::default();
        let mut issuer = Issuer::new(&recorder, &env, FailurePolicy::Continue);
        f(&mut issuer);
        recorder.commands()
    }

    #[test]
    fn test_create_panes_splits_then_layouts() {
        for pane_count in 0usize..5 {
            let window = WindowDescription::new(
                "w",
                (0..pane_count).map(|_| PaneDescription::default()).collect(),
            );
            let builder = WindowBuilder::new("demo", "/srv", 3, &window);
            let commands = record(|issuer| builder.create_panes(issuer).unwrap());

            let (last, splits) = commands.split_last().unwrap();
            assert_eq!(splits.len(), pane_count.saturating_sub(1));
            assert!(splits.iter().all(|c| c == "split-window -t demo:3"));
            assert_eq!(last, "select-layout -t demo:3 even-vertical");
        }
    }

    #[test]
    fn test_create_issues_full_sequence() {
        let window = WindowDescription::new(
            "server",
            vec![
                PaneDescription::new(["cd api", "cargo run"]),
                PaneDescription::from("htop"),
            ],
        )
        .with_layout(Layout::MainHorizontal);
        let builder = WindowBuilder::new("demo", "/srv/demo", 2, &window);

        let commands = record(|issuer| builder.create(issuer).unwrap());

        assert_eq!(
            commands,
            vec![
                "new-window -c /srv/demo -t demo:2 -n server",
                "split-window -t demo:2",
                "select-layout -t demo:2 main-horizontal",
                "send-keys -t demo:2.1 'cd api' C-m",
                "send-keys -t demo:2.1 'cargo run' C-m",
                "send-keys -t demo:2.2 htop C-m",
            ]
        );
    }

    #[test]
    fn test_rename_targets_window() {
        let window = WindowDescription::new("editor", vec![]);
        let builder = WindowBuilder::new("demo", "/srv", 1, &window);
        let commands = record(|issuer| builder.rename(issuer).unwrap());

        assert_eq!(commands, vec!["rename-window -t demo:1 editor"]);
    }

    #[test]
    fn test_window_without_panes_sends_nothing() {
        let window = WindowDescription::new("shell", vec![]);
        let builder = WindowBuilder::new("demo", "/srv", 2, &window);
        let commands = record(|issuer| builder.run_commands(issuer).unwrap());

        assert!(commands.is_empty());
    }
}
