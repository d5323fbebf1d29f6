//! Confirmable execution of native commands.
//!
//! The [`Executor`] runs a fixed pipeline over one [`NativeCommand`]:
//! explain, confirm, announce, execute. Each stage is gated by the
//! caller's [`ExecutionOptions`]; the stages always run in that order.
//!
//! The child process inherits stdin/stdout/stderr so the operator sees and
//! can answer the package manager's own prompts. A child terminated by
//! SIGINT counts as an operator cancel, not a failure.

use std::io::{self, BufRead, StdinLock, Write};
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, Stdio};

use nix::sys::signal::Signal;
use thiserror::Error;

use super::ExecutionOptions;
use super::backend::NativeCommand;
use crate::ui;

/// Why the execute stage did not succeed.
#[derive(Debug, Error)]
pub enum RunFailure {
    #[error("command exited with status {0}")]
    ExitStatus(i32),

    #[error("command terminated by signal {0}")]
    Signal(i32),

    #[error("failed to start command: {0}")]
    Spawn(#[from] io::Error),
}

/// Result of one operation. Cancellation is a first-class outcome, not an
/// error: only `Failed` should be reported as one.
#[derive(Debug)]
pub enum Outcome {
    Completed,
    Canceled,
    Failed(RunFailure),
}

/// How a spawned process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Exited(i32),
    Signaled(i32),
}

/// Seam between the pipeline and the operating system, so tests can record
/// spawn attempts and script statuses.
pub trait Spawner {
    fn spawn(&mut self, command: &str) -> io::Result<ProcessStatus>;
}

/// Runs the command through `sh -c` with inherited standard streams and
/// blocks until it exits.
pub struct ShellSpawner;

impl Spawner for ShellSpawner {
    fn spawn(&mut self, command: &str) -> io::Result<ProcessStatus> {
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        Ok(match status.code() {
            Some(code) => ProcessStatus::Exited(code),
            None => ProcessStatus::Signaled(status.signal().unwrap_or_default()),
        })
    }
}

pub struct Executor<S = ShellSpawner, R = StdinLock<'static>> {
    spawner: S,
    input: R,
}

impl Executor {
    /// Executor wired to the real shell and the process's stdin.
    pub fn interactive() -> Self {
        Executor {
            spawner: ShellSpawner,
            input: io::stdin().lock(),
        }
    }
}

impl<S: Spawner, R: BufRead> Executor<S, R> {
    pub fn new(spawner: S, input: R) -> Self {
        Executor { spawner, input }
    }

    /// Run one native command through the explain/confirm/announce/execute
    /// pipeline.
    pub fn run(&mut self, command: &NativeCommand, opts: ExecutionOptions) -> Outcome {
        if opts.explain {
            println!("{}", ui::heading("Explanation"));
            println!("  {}", command.explanation);
            println!();
            println!("{}", ui::key("Native command:"));
            println!("  {}", ui::value(&command.command));
            println!();
        }

        if opts.dry_run && !self.confirm(command) {
            println!("{}", ui::muted("Skipped running command."));
            return Outcome::Canceled;
        }

        if !opts.explain {
            println!("{}", ui::info(&command.explanation));
        }

        println!("{}", ui::key("Running:"));
        println!("  {}", ui::value(&command.command));

        match self.spawner.spawn(&command.command) {
            Ok(ProcessStatus::Exited(0)) => Outcome::Completed,
            Ok(ProcessStatus::Signaled(sig)) if sig == Signal::SIGINT as i32 => {
                println!();
                println!("{}", ui::muted("Command canceled by user."));
                Outcome::Canceled
            }
            Ok(ProcessStatus::Exited(code)) => Outcome::Failed(RunFailure::ExitStatus(code)),
            Ok(ProcessStatus::Signaled(sig)) => Outcome::Failed(RunFailure::Signal(sig)),
            Err(err) => Outcome::Failed(RunFailure::Spawn(err)),
        }
    }

    /// Show the command and ask for a yes/no answer. Closed or unreadable
    /// input counts as "no" so a non-interactive run never mutates anything.
    fn confirm(&mut self, command: &NativeCommand) -> bool {
        println!("{}", ui::heading("Dry run"));
        println!("  Would run:");
        println!("    {}", ui::value(&command.command));
        println!();
        print!("{} [y/N]: ", ui::info("Do you want to run this command now"));
        let _ = io::stdout().flush();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => {
                println!();
                false
            }
            Ok(_) => {
                let proceed = matches!(answer.trim().to_lowercase().as_str(), "y" | "yes");
                if proceed {
                    println!();
                }
                proceed
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    /// Scripted spawner recording every command it was asked to run.
    pub(crate) struct FakeSpawner {
        pub status: io::Result<ProcessStatus>,
        pub calls: Vec<String>,
    }

    impl FakeSpawner {
        pub fn exiting(code: i32) -> Self {
            FakeSpawner {
                status: Ok(ProcessStatus::Exited(code)),
                calls: Vec::new(),
            }
        }

        pub fn signaled(sig: i32) -> Self {
            FakeSpawner {
                status: Ok(ProcessStatus::Signaled(sig)),
                calls: Vec::new(),
            }
        }
    }

    impl<R> Executor<FakeSpawner, R> {
        pub(crate) fn spawner_calls(&self) -> &[String] {
            &self.spawner.calls
        }
    }

    impl Spawner for FakeSpawner {
        fn spawn(&mut self, command: &str) -> io::Result<ProcessStatus> {
            self.calls.push(command.to_string());
            match &self.status {
                Ok(status) => Ok(*status),
                Err(err) => Err(io::Error::new(err.kind(), err.to_string())),
            }
        }
    }

    fn command() -> NativeCommand {
        NativeCommand {
            command: "sudo apt install -y htop".to_string(),
            explanation: "Install packages with apt".to_string(),
        }
    }

    fn opts(dry_run: bool) -> ExecutionOptions {
        ExecutionOptions {
            dry_run,
            ..Default::default()
        }
    }

    #[test]
    fn declined_confirmation_cancels_without_spawning() {
        let mut exec = Executor::new(FakeSpawner::exiting(0), Cursor::new("n\n"));
        let outcome = exec.run(&command(), opts(true));
        assert!(matches!(outcome, Outcome::Canceled));
        assert!(exec.spawner.calls.is_empty());
    }

    #[test]
    fn closed_input_is_an_implicit_no() {
        let mut exec = Executor::new(FakeSpawner::exiting(0), Cursor::new(""));
        let outcome = exec.run(&command(), opts(true));
        assert!(matches!(outcome, Outcome::Canceled));
        assert!(exec.spawner.calls.is_empty());
    }

    #[test]
    fn junk_answer_is_a_no() {
        let mut exec = Executor::new(FakeSpawner::exiting(0), Cursor::new("maybe\n"));
        assert!(matches!(exec.run(&command(), opts(true)), Outcome::Canceled));
        assert!(exec.spawner.calls.is_empty());
    }

    #[test]
    fn accepted_confirmation_spawns_the_shown_command() {
        let mut exec = Executor::new(FakeSpawner::exiting(0), Cursor::new("y\n"));
        let outcome = exec.run(&command(), opts(true));
        assert!(matches!(outcome, Outcome::Completed));
        assert_eq!(exec.spawner.calls, vec!["sudo apt install -y htop"]);
    }

    #[test]
    fn confirmation_answer_is_trimmed_and_case_insensitive() {
        let mut exec = Executor::new(FakeSpawner::exiting(0), Cursor::new("  YES \n"));
        assert!(matches!(exec.run(&command(), opts(true)), Outcome::Completed));
        assert_eq!(exec.spawner.calls.len(), 1);
    }

    #[test]
    fn no_dry_run_spawns_without_prompting() {
        // Empty input would read as "no" if a prompt happened.
        let mut exec = Executor::new(FakeSpawner::exiting(0), Cursor::new(""));
        let outcome = exec.run(&command(), opts(false));
        assert!(matches!(outcome, Outcome::Completed));
        assert_eq!(exec.spawner.calls.len(), 1);
    }

    #[test]
    fn nonzero_exit_is_a_failure() {
        let mut exec = Executor::new(FakeSpawner::exiting(1), Cursor::new(""));
        match exec.run(&command(), opts(false)) {
            Outcome::Failed(RunFailure::ExitStatus(1)) => {}
            other => panic!("expected exit-status failure, got {other:?}"),
        }
    }

    #[test]
    fn sigint_termination_is_a_cancel() {
        let mut exec = Executor::new(
            FakeSpawner::signaled(Signal::SIGINT as i32),
            Cursor::new(""),
        );
        assert!(matches!(exec.run(&command(), opts(false)), Outcome::Canceled));
    }

    #[test]
    fn other_signals_are_failures() {
        let mut exec = Executor::new(
            FakeSpawner::signaled(Signal::SIGKILL as i32),
            Cursor::new(""),
        );
        match exec.run(&command(), opts(false)) {
            Outcome::Failed(RunFailure::Signal(sig)) => {
                assert_eq!(sig, Signal::SIGKILL as i32);
            }
            other => panic!("expected signal failure, got {other:?}"),
        }
    }

    #[test]
    fn spawn_error_is_a_failure() {
        let mut exec = Executor::new(
            FakeSpawner {
                status: Err(io::Error::new(io::ErrorKind::NotFound, "sh missing")),
                calls: Vec::new(),
            },
            Cursor::new(""),
        );
        match exec.run(&command(), opts(false)) {
            Outcome::Failed(RunFailure::Spawn(err)) => {
                assert_eq!(err.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected spawn failure, got {other:?}"),
        }
    }

    #[test]
    fn explain_alone_still_executes() {
        let mut exec = Executor::new(FakeSpawner::exiting(0), Cursor::new(""));
        let outcome = exec.run(
            &command(),
            ExecutionOptions {
                explain: true,
                ..Default::default()
            },
        );
        assert!(matches!(outcome, Outcome::Completed));
        assert_eq!(exec.spawner.calls.len(), 1);
    }
}
