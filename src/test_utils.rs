//! Test utilities for common test setup.
//!
//! This module provides a scripted [`CommandRunner`] shared by the unit tests
//! of the parsing, classification and check stages.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use crate::sources::runner::{CheckContext, CommandError, CommandOutput, CommandRunner};

type MockCommandKey = (String, Vec<String>);

/// Scripted reaction to one command line.
#[derive(Clone, Debug)]
enum Scripted {
    Output(CommandOutput),
    Fail,
}

/// What: Runner answering from a table keyed by program and arguments.
///
/// Details:
/// - Unscripted command lines fail as if the program could not be spawned.
/// - Every invocation is recorded for later assertions.
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: HashMap<MockCommandKey, Scripted>,
    calls: Mutex<Vec<MockCommandKey>>,
}

fn key(program: &str, args: &[&str]) -> MockCommandKey {
    (
        program.to_string(),
        args.iter().map(ToString::to_string).collect(),
    )
}

impl MockRunner {
    /// Script `program args` to print `text` and exit with `exit_code`.
    #[must_use]
    pub fn respond(mut self, program: &str, args: &[&str], text: &str, exit_code: i32) -> Self {
        self.responses.insert(
            key(program, args),
            Scripted::Output(CommandOutput::new(text, Some(exit_code))),
        );
        self
    }

    /// Script `program args` to fail before producing output.
    #[must_use]
    pub fn fail(mut self, program: &str, args: &[&str]) -> Self {
        self.responses.insert(key(program, args), Scripted::Fail);
        self
    }

    /// Whether `program args` was invoked.
    pub fn was_called(&self, program: &str, args: &[&str]) -> bool {
        let wanted = key(program, args);
        self.calls
            .lock()
            .expect("poisoned calls mutex")
            .iter()
            .any(|c| *c == wanted)
    }

    /// Number of invocations of `program`, whatever the arguments.
    pub fn call_count(&self, program: &str) -> usize {
        self.calls
            .lock()
            .expect("poisoned calls mutex")
            .iter()
            .filter(|(p, _)| p == program)
            .count()
    }
}

impl CommandRunner for MockRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        _ctx: &CheckContext,
    ) -> impl Future<Output = Result<CommandOutput, CommandError>> + Send {
        let key = key(program, args);
        self.calls
            .lock()
            .expect("poisoned calls mutex")
            .push(key.clone());
        let result = match self.responses.get(&key) {
            Some(Scripted::Output(out)) => Ok(out.clone()),
            Some(Scripted::Fail) | None => Err(CommandError::Spawn {
                program: program.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        };
        std::future::ready(result)
    }
}
