//! Blocking process execution.

use std::fs::{File, OpenOptions};
use std::process::{Command, Stdio};

use crate::command::{Redirect, ToolCommand};
use crate::error::{Result, ToolchainError};

/// Exit status of a finished tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    code: Option<i32>,
}

impl ToolStatus {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

/// Executes tool commands.
///
/// Object-safe so stages can hold a `&dyn ProcessRunner`.
pub trait ProcessRunner {
    /// Run `command` to completion.
    ///
    /// A program that cannot be started is an error; a program that runs and
    /// exits non-zero is reported through the returned status.
    fn run(&self, command: &ToolCommand) -> Result<ToolStatus>;

    /// Run `command` and return what it wrote to stdout.
    ///
    /// A non-zero exit is [`ToolchainError::Failed`]. Any stdout redirect on
    /// `command` is ignored.
    fn output(&self, command: &ToolCommand) -> Result<String>;

    /// Run `command` and treat a non-zero exit as [`ToolchainError::Failed`].
    fn run_checked(&self, command: &ToolCommand) -> Result<()> {
        let status = self.run(command)?;
        if status.is_success() {
            Ok(())
        } else {
            Err(ToolchainError::Failed {
                command: command.to_string(),
                code: status.code(),
            })
        }
    }
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, command: &ToolCommand) -> Result<ToolStatus> {
        (**self).run(command)
    }

    fn output(&self, command: &ToolCommand) -> Result<String> {
        (**self).output(command)
    }
}

/// Runs commands as real child processes, blocking until each exits.
///
/// Stdin and stderr are inherited; stdout is inherited unless the command
/// redirects it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolStatus> {
        log::debug!("$ {command}");

        let mut process = Command::new(command.program());
        process.args(command.arguments());
        if let Some(dir) = command.working_dir() {
            process.current_dir(dir);
        }
        if let Some(redirect) = command.stdout() {
            process.stdout(Stdio::from(open_redirect(redirect)?));
        }

        let status = process.status().map_err(|source| ToolchainError::Spawn {
            program: command.program().to_string(),
            source,
        })?;
        Ok(ToolStatus { code: status.code() })
    }

    fn output(&self, command: &ToolCommand) -> Result<String> {
        log::debug!("$ {command}");

        let mut process = Command::new(command.program());
        process.args(command.arguments()).stderr(Stdio::inherit());
        if let Some(dir) = command.working_dir() {
            process.current_dir(dir);
        }

        let output = process.output().map_err(|source| ToolchainError::Spawn {
            program: command.program().to_string(),
            source,
        })?;
        if !output.status.success() {
            return Err(ToolchainError::Failed {
                command: command.to_string(),
                code: output.status.code(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn open_redirect(redirect: &Redirect) -> Result<File> {
    let opened = match redirect {
        Redirect::Truncate(path) => File::create(path),
        Redirect::Append(path) => OpenOptions::new().create(true).append(true).open(path),
    };
    opened.map_err(|source| ToolchainError::Redirect {
        path: redirect.path().to_path_buf(),
        source,
    })
}
