//! A tiny text protocol for driving a [`Sweeper`].
//!
//! Each command produces zero or more lines of output:
//!
//! - `step` processes one event silently,
//! - `step -p` processes one event and prints a trace line like
//!   `event: S -5.00 1`,
//! - `status` prints the arcs on the sweep line, like `status: 2:0 1`,
//! - `run` processes everything that's left and prints a summary like
//!   `summary: 2 segments, 1 intersections`.
//!
//! Stepping past the last event prints `error: no more events`.

use std::str::FromStr;

use crate::{sweep::Sweeper, Error};

/// One line of a command script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Command {
    /// Process one event.
    Step,
    /// Process one event and print a trace of it.
    StepPrint,
    /// Print the current sweep-line status.
    Status,
    /// Process all remaining events and print a summary.
    Run,
}

/// A command line that we didn't understand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseCommandError {
    /// The offending line, trimmed.
    pub line: String,
}

impl std::fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown command {:?}", self.line)
    }
}

impl std::error::Error for ParseCommandError {}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<_> = s.split_whitespace().collect();
        match words.as_slice() {
            ["step"] => Ok(Command::Step),
            ["step", "-p"] => Ok(Command::StepPrint),
            ["status"] => Ok(Command::Status),
            ["run"] => Ok(Command::Run),
            _ => Err(ParseCommandError {
                line: s.trim().to_owned(),
            }),
        }
    }
}

impl Sweeper<'_> {
    /// Executes a command, returning the lines it prints.
    ///
    /// Running out of events is reported in the output, not as an error.
    /// Other errors mean that the sweep itself went wrong.
    pub fn execute(&mut self, command: Command) -> Result<Vec<String>, Error> {
        let no_more = || vec![format!("error: {}", Error::NoMoreEvents)];
        match command {
            Command::Step => match self.step() {
                Ok(_) => Ok(Vec::new()),
                Err(Error::NoMoreEvents) => Ok(no_more()),
                Err(e) => Err(e),
            },
            Command::StepPrint => match self.step() {
                Ok(report) => Ok(vec![report.to_string()]),
                Err(Error::NoMoreEvents) => Ok(no_more()),
                Err(e) => Err(e),
            },
            Command::Status => Ok(vec![self.status().to_string()]),
            Command::Run => Ok(vec![self.run()?.to_string()]),
        }
    }
}
