//! Running tmux command lines
//!
//! The builders hand command lines to an [`Executor`] and never care whether
//! anything is spawned. [`SystemExecutor`] runs tmux for real;
//! [`RecordingExecutor`] prints and remembers the lines instead, which is
//! what the dry-run script is made of.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    ffi::{OsStr, OsString},
    io::Write,
    process::{Command, Stdio},
};

use super::commands::{TMUX_ENV, is_probe};
use crate::error::{Error, Result};

// =============================================================================
// Environment
// =============================================================================

/// Environment handed to child processes.
///
/// Captured once from the process and passed down explicitly, so building
/// a session never reads or mutates the ambient environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<OsString, OsString>,
}

impl Environment {
    /// Snapshot of the current process environment
    pub fn from_process() -> Self {
        std::env::vars_os().collect()
    }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Copy of this environment with `key` removed
    pub fn without(&self, key: &str) -> Self {
        let mut vars = self.vars.clone();
        vars.remove(OsStr::new(key));
        Self { vars }
    }

    /// Whether a tmux client marker is present
    pub fn inside_tmux(&self) -> bool {
        self.get(TMUX_ENV).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsString, &OsString)> {
        self.vars.iter()
    }
}

impl<K: Into<OsString>, V: Into<OsString>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// =============================================================================
// Executor
// =============================================================================

/// Exit status and captured streams of one tmux invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `-1` when the process was killed by a signal
    pub status: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// The `(0, "", "")` result reported when nothing was run
    pub fn synthetic() -> Self {
        Self::default()
    }

    pub fn success(&self) -> bool {
        self.status == 0
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Something that can run a tmux command line
pub trait Executor {
    /// Run one command line and capture its output.
    fn execute(&self, command: &str, env: &Environment) -> Result<CommandOutput>;

    /// Run a command line that takes over the terminal (attach, switch).
    fn execute_interactive(&self, command: &str, env: &Environment) -> Result<CommandOutput> {
        self.execute(command, env)
    }
}

/// Executor that spawns the multiplexer
#[derive(Debug, Clone)]
pub struct SystemExecutor {
    program: String,
    /// Arguments placed before every command line
    leading_args: Vec<String>,
}

impl SystemExecutor {
    /// Executor for a configured multiplexer command such as `tmux -2`.
    /// The first word is the program, the rest precede every command line.
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let mut words = split(command_line)?;
        if words.is_empty() {
            return Err(Error::MalformedDescription(
                "multiplexer command is empty".to_string(),
            ));
        }
        let program = words.remove(0);

        Ok(Self {
            program,
            leading_args: words,
        })
    }

    fn command(&self, command: &str, env: &Environment) -> Result<Command> {
        let args = split(command)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(args)
            .env_clear()
            .envs(env.iter());
        Ok(cmd)
    }

    fn spawn_error(&self, source: std::io::Error) -> Error {
        Error::SpawnFailed {
            program: self.program.clone(),
            source,
        }
    }
}

impl Executor for SystemExecutor {
    fn execute(&self, command: &str, env: &Environment) -> Result<CommandOutput> {
        let output = self
            .command(command, env)?
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn execute_interactive(&self, command: &str, env: &Environment) -> Result<CommandOutput> {
        let status = self
            .command(command, env)?
            .status()
            .map_err(|e| self.spawn_error(e))?;

        Ok(CommandOutput {
            status: status.code().unwrap_or(-1),
            ..CommandOutput::default()
        })
    }
}

fn split(command: &str) -> Result<Vec<String>> {
    shell_words::split(command).map_err(|source| Error::Tokenize {
        command: command.to_string(),
        source,
    })
}

/// Executor that writes each command line to a sink instead of running it.
///
/// Lines are written as `<program> <command>`, indented by a tab except for
/// the existence probe, so the output reads as a shell script.
pub struct RecordingExecutor {
    program: String,
    sink: RefCell<Box<dyn Write>>,
    recorded: RefCell<Vec<String>>,
}

impl RecordingExecutor {
    pub fn new(program: impl Into<String>, sink: impl Write + 'static) -> Self {
        Self {
            program: program.into(),
            sink: RefCell::new(Box::new(sink)),
            recorded: RefCell::new(Vec::new()),
        }
    }

    /// Recorder that prints to standard output
    pub fn stdout(program: impl Into<String>) -> Self {
        Self::new(program, std::io::stdout())
    }

    /// Recorder that only remembers
    pub fn silent(program: impl Into<String>) -> Self {
        Self::new(program, std::io::sink())
    }

    /// Command lines seen so far, without the program name
    pub fn commands(&self) -> Vec<String> {
        self.recorded.borrow().clone()
    }

    /// Write a line of script text that is not a tmux command.
    pub fn comment(&self, text: &str) -> Result<()> {
        writeln!(self.sink.borrow_mut(), "{}", text).map_err(Error::Output)
    }
}

impl Executor for RecordingExecutor {
    fn execute(&self, command: &str, _env: &Environment) -> Result<CommandOutput> {
        let indent = if is_probe(command) { "" } else { "\t" };
        writeln!(
            self.sink.borrow_mut(),
            "{}{} {}",
            indent,
            self.program,
            command
        )
        .map_err(Error::Output)?;

        self.recorded.borrow_mut().push(command.to_string());
        Ok(CommandOutput::synthetic())
    }
}

// =============================================================================
// Test Support
// =============================================================================


#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::error::ErrorKind;

    /// Sink that can be inspected after the recorder owns it
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    #[test]
    fn test_recording_executor_prints_script_lines() {
        let buf = SharedBuf::default();
        let recorder = RecordingExecutor::new("tmux", buf.clone());
        let env = Environment::default();

        let probe = recorder
            .execute("start-server; has-session -t demo", &env)
            .unwrap();
        recorder.execute("kill-session -t demo", &env).unwrap();

        assert_eq!(probe, CommandOutput::synthetic());
        assert_eq!(
            buf.text(),
            "tmux start-server; has-session -t demo\n\ttmux kill-session -t demo\n"
        );
        assert_eq!(
            recorder.commands(),
            vec!["start-server; has-session -t demo", "kill-session -t demo"]
        );
    }

    #[test]
    fn test_environment_without() {
        let env: Environment = [("TMUX", "/tmp/tmux-1000/default,1,0"), ("HOME", "/home/me")]
            .into_iter()
            .collect();
        assert!(env.inside_tmux());

        let stripped = env.without(TMUX_ENV);
        assert!(!stripped.inside_tmux());
        assert_eq!(stripped.get("HOME"), Some(OsStr::new("/home/me")));
        // The original is left untouched
        assert!(env.inside_tmux());
    }

    #[test]
    fn test_missing_program_is_spawn_failure() {
        let executor = SystemExecutor::from_command_line("muster-test-no-such-binary").unwrap();
        let err = executor
            .execute("list-sessions", &Environment::from_process())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProcessSpawnFailed);
    }

    #[test]
    fn test_unbalanced_quotes_fail_before_spawning() {
        let executor = SystemExecutor::from_command_line("muster-test-no-such-binary").unwrap();
        let err = executor
            .execute("send-keys -t demo:1.1 'oops C-m", &Environment::default())
            .unwrap_err();
        assert!(matches!(err, Error::Tokenize { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_captures_output_and_env() {
        // `sh -c <script>` stands in for the multiplexer
        let executor = SystemExecutor::from_command_line("sh").unwrap();
        let mut env = Environment::default();
        env.set("MUSTER_TEST_VALUE", "from env");

        let output = executor
            .execute(
                r#"-c 'printf "%s" "$MUSTER_TEST_VALUE"; echo oops >&2; exit 3'"#,
                &env,
            )
            .unwrap();

        assert_eq!(output.status, 3);
        assert_eq!(output.stdout, b"from env");
        assert_eq!(output.stderr_lossy(), "oops");
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_line_words_precede_each_command() {
        // sh hands the command line's words to the script as $0 and $1
        let executor =
            SystemExecutor::from_command_line(r#"sh -c 'printf "%s,%s" "$0" "$1"'"#).unwrap();

        let output = executor
            .execute("has-session 'two words'", &Environment::default())
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, b"has-session,two words");
    }

    #[test]
    fn test_empty_command_line_is_malformed() {
        for line in ["", "   "] {
            let err = SystemExecutor::from_command_line(line).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedDescription);
        }
        assert!(matches!(
            SystemExecutor::from_command_line("tmux 'unterminated"),
            Err(Error::Tokenize { .. })
        ));
    }
}
