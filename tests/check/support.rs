//! Scripted runners shared by the integration tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use aptpulse::sources::apt::{PhasingMode, simulate_args};
use aptpulse::sources::{CheckContext, CommandError, CommandOutput, CommandRunner, SystemCommandRunner};

type Key = (String, Vec<String>);

/// Runner answering from a script; `find` can optionally run for real.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: HashMap<Key, CommandOutput>,
    real_find: bool,
    calls: Mutex<Vec<Key>>,
}

fn key(program: &str, args: &[&str]) -> Key {
    (
        program.to_string(),
        args.iter().map(ToString::to_string).collect(),
    )
}

impl ScriptedRunner {
    pub fn respond(mut self, program: &str, args: &[&str], text: &str, exit_code: i32) -> Self {
        self.responses.insert(
            key(program, args),
            CommandOutput::new(text, Some(exit_code)),
        );
        self
    }

    /// Script both simulation passes.
    pub fn passes(self, excluded: &str, included: &str) -> Self {
        self.respond("env", &simulate_args(PhasingMode::Exclude), excluded, 0)
            .respond("env", &simulate_args(PhasingMode::Include), included, 0)
    }

    pub fn policy(self, name: &str, text: &str) -> Self {
        self.respond("apt-cache", &["policy", name], text, 0)
    }

    pub fn with_real_find(mut self) -> Self {
        self.real_find = true;
        self
    }

    pub fn calls_to(&self, program: &str) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .expect("poisoned calls mutex")
            .iter()
            .filter(|(p, _)| p == program)
            .map(|(_, a)| a.clone())
            .collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        ctx: &CheckContext,
    ) -> impl Future<Output = Result<CommandOutput, CommandError>> + Send {
        let key = key(program, args);
        self.calls
            .lock()
            .expect("poisoned calls mutex")
            .push(key.clone());
        let scripted = self.responses.get(&key).cloned();
        let real = self.real_find && program == "find";
        let program = program.to_string();
        let args: Vec<String> = key.1;
        let ctx = ctx.clone();
        async move {
            if real {
                let argv: Vec<&str> = args.iter().map(String::as_str).collect();
                return SystemCommandRunner.run(&program, &argv, &ctx).await;
            }
            scripted.ok_or_else(|| CommandError::Spawn {
                program,
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }
}

/// Runner whose every command is a long `sleep`, to exercise deadlines.
#[derive(Clone, Copy, Default)]
pub struct HangingRunner;

impl CommandRunner for HangingRunner {
    fn run(
        &self,
        _program: &str,
        _args: &[&str],
        ctx: &CheckContext,
    ) -> impl Future<Output = Result<CommandOutput, CommandError>> + Send {
        let ctx = ctx.clone();
        async move { SystemCommandRunner.run("sleep", &["30"], &ctx).await }
    }
}

pub const POLICY_MAIN: &str = "\
  Candidate: 2.0
  Version table:
     2.0 500
        500 http://archive.ubuntu.com/ubuntu noble-updates/main amd64 Packages
";

pub const POLICY_SECURITY: &str = "\
  Candidate: 2.0
  Version table:
     2.0 500
        500 http://security.ubuntu.com/ubuntu noble-security/main amd64 Packages
";

pub const POLICY_UNIVERSE: &str = "\
  Candidate: 2.0
  Version table:
     2.0 500
        500 http://archive.ubuntu.com/ubuntu noble-updates/universe amd64 Packages
";
