//! In-memory runner that records commands instead of executing them.

use std::cell::RefCell;
use std::fmt;

use crate::command::ToolCommand;
use crate::error::Result;
use crate::runner::{ProcessRunner, ToolStatus};

type Predicate = Box<dyn Fn(&ToolCommand) -> bool>;

/// A [`ProcessRunner`] fake.
///
/// Every command is recorded in order and succeeds, unless it matches one of
/// the configured failure predicates, in which case it exits with status 1.
#[derive(Default)]
pub struct RecordingRunner {
    commands: RefCell<Vec<ToolCommand>>,
    failures: Vec<Predicate>,
    outputs: Vec<(Predicate, String)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every command matching `predicate`.
    pub fn failing_when(mut self, predicate: impl Fn(&ToolCommand) -> bool + 'static) -> Self {
        self.failures.push(Box::new(predicate));
        self
    }

    /// Fail every invocation of `program`.
    pub fn failing_program(self, program: &str) -> Self {
        let program = program.to_string();
        self.failing_when(move |cmd| cmd.program() == program)
    }

    /// Answer [`ProcessRunner::output`] with `stdout` for commands matching
    /// `predicate`. Unmatched commands print nothing.
    pub fn with_output(
        mut self,
        predicate: impl Fn(&ToolCommand) -> bool + 'static,
        stdout: impl Into<String>,
    ) -> Self {
        self.outputs.push((Box::new(predicate), stdout.into()));
        self
    }

    /// All commands run so far, in order.
    pub fn commands(&self) -> Vec<ToolCommand> {
        self.commands.borrow().clone()
    }

    /// Program names of all commands run so far, in order.
    pub fn programs(&self) -> Vec<String> {
        self.commands
            .borrow()
            .iter()
            .map(|cmd| cmd.program().to_string())
            .collect()
    }

    /// Whether `program` was invoked at least once.
    pub fn ran(&self, program: &str) -> bool {
        self.commands.borrow().iter().any(|cmd| cmd.program() == program)
    }

    /// Number of recorded commands matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&ToolCommand) -> bool) -> usize {
        self.commands.borrow().iter().filter(|cmd| predicate(cmd)).count()
    }

    /// Position of the first recorded command matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&ToolCommand) -> bool) -> Option<usize> {
        self.commands.borrow().iter().position(predicate)
    }

    pub fn clear(&self) {
        self.commands.borrow_mut().clear();
    }
}

impl fmt::Debug for RecordingRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingRunner")
            .field("commands", &self.commands.borrow())
            .field("failures", &self.failures.len())
            .field("outputs", &self.outputs.len())
            .finish()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolStatus> {
        self.commands.borrow_mut().push(command.clone());
        if self.failures.iter().any(|fails| fails(command)) {
            Ok(ToolStatus::from_code(1))
        } else {
            Ok(ToolStatus::success())
        }
    }

    fn output(&self, command: &ToolCommand) -> Result<String> {
        self.run_checked(command)?;
        Ok(self
            .outputs
            .iter()
            .find(|(matches, _)| matches(command))
            .map(|(_, stdout)| stdout.clone())
            .unwrap_or_default())
    }
}
