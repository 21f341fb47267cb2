//! Structured external command lines.
//!
//! A [`ToolCommand`] is a program plus an ordered argument vector. Output
//! redirection that the shell used to do (`> dump.txt`, `>> head.txt`) is
//! carried as data and applied by the runner, so no command ever goes through
//! a shell and nothing needs quoting.

use std::fmt;
use std::path::{Path, PathBuf};

/// Where a command's standard output goes, if not to the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Create or truncate the file.
    Truncate(PathBuf),
    /// Create the file if needed and append to it.
    Append(PathBuf),
}

impl Redirect {
    /// The file receiving the output.
    pub fn path(&self) -> &Path {
        match self {
            Redirect::Truncate(path) | Redirect::Append(path) => path,
        }
    }
}

/// A single external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    stdout: Option<Redirect>,
    current_dir: Option<PathBuf>,
}

impl ToolCommand {
    /// Start a command line for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdout: None,
            current_dir: None,
        }
    }

    /// Build a command from a configured prefix: the first element is the
    /// program, the rest are leading arguments. Returns `None` for an empty
    /// prefix.
    pub fn from_prefix(prefix: &[String]) -> Option<Self> {
        let (program, args) = prefix.split_first()?;
        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments in order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a filesystem path as an argument.
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    /// Send stdout to `path`, truncating it first.
    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(Redirect::Truncate(path.into()));
        self
    }

    /// Append stdout to `path`.
    pub fn stdout_append(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(Redirect::Append(path.into()));
        self
    }

    /// Apply an explicit stdout redirection.
    pub fn redirect(mut self, redirect: Redirect) -> Self {
        self.stdout = Some(redirect);
        self
    }

    /// Run the command from `dir`.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn stdout(&self) -> Option<&Redirect> {
        self.stdout.as_ref()
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Whether the first argument is `sub` (e.g. `cargo build`).
    pub fn is_subcommand(&self, program: &str, sub: &str) -> bool {
        self.program == program && self.args.first().map(String::as_str) == Some(sub)
    }
}

impl fmt::Display for ToolCommand {
    /// Renders a shell-like line for logs. Never executed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        match &self.stdout {
            Some(Redirect::Truncate(path)) => write!(f, " > {}", path.display()),
            Some(Redirect::Append(path)) => write!(f, " >> {}", path.display()),
            None => Ok(()),
        }
    }
}
