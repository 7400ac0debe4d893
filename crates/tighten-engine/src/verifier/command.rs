//! Process-backed step execution.
//!
//! [`CommandRunner`] spawns each step as a child process in the step's
//! directory, discards stdout, keeps the tail of stderr for diagnostics, and
//! enforces an optional deadline by polling the child.
//!
//! On Unix each step leads its own process group. A timeout kills the whole
//! group, so compilers and test binaries started by the step go with it.
//! Processes left behind after the step exits are killed too once they keep
//! stderr open past the deadline.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{StepRunner, StepStatus, VerificationStep, VerifierError};

/// Tracing target for child process management.
const COMMAND_TARGET: &str = "tighten_engine::verifier::command";

/// Interval between exit checks while a step is running.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Longest wait for stderr to close after the step has exited.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Number of stderr lines kept for failure diagnostics.
const STDERR_TAIL_LINES: usize = 20;

/// Runs verification steps as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner {
    timeout: Option<Duration>,
}

impl CommandRunner {
    /// Creates a runner; `None` lets steps run indefinitely.
    #[must_use]
    pub const fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl StepRunner for CommandRunner {
    fn run(&self, step: &VerificationStep) -> Result<StepStatus, VerifierError> {
        let started = Instant::now();
        let mut child = spawn(step)?;
        debug!(
            target: COMMAND_TARGET,
            pid = child.id(),
            command = %step,
            "spawned verification process"
        );

        let stderr = child.stderr.take().map(spawn_stderr_drain);
        let status = wait_for_exit(step, &mut child, started, self.timeout)?;
        let Some(tail) = stderr else {
            return Ok(status);
        };

        if let StepStatus::TimedOut { .. } = status {
            // The group is already dead; the drain thread ends on its own.
            return Ok(status);
        }

        let grace = self
            .timeout
            .map_or(DRAIN_GRACE, |limit| limit.saturating_sub(started.elapsed()))
            .clamp(POLL_INTERVAL, DRAIN_GRACE);
        match tail.recv_timeout(grace) {
            Ok(lines) => {
                if let StepStatus::Failed { code } = status {
                    debug!(
                        target: COMMAND_TARGET,
                        command = %step,
                        ?code,
                        stderr = %Vec::from(lines).join("\n"),
                        "verification process stderr"
                    );
                }
            }
            Err(RecvTimeoutError::Disconnected) => {}
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    target: COMMAND_TARGET,
                    command = %step,
                    "processes left by the step still hold stderr, killing them"
                );
                kill_group(&mut child);
            }
        }

        Ok(status)
    }
}

fn spawn(step: &VerificationStep) -> Result<Child, VerifierError> {
    let mut command = Command::new(step.program());
    command
        .args(step.command_args())
        .current_dir(step.directory())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    command.spawn().map_err(|err| VerifierError::Spawn {
        program: step.program().to_owned(),
        directory: step.directory().display().to_string(),
        source: Arc::new(err),
    })
}

/// Reads stderr on a background thread so the child never blocks on a full
/// pipe. The last few lines are sent once the pipe closes.
fn spawn_stderr_drain(stderr: impl Read + Send + 'static) -> Receiver<VecDeque<String>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line);
        }
        drop(sender.send(tail));
    });
    receiver
}

/// Kills every process in the step's group; the group id is the leader's pid.
#[cfg(unix)]
fn kill_group(child: &mut Child) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    match i32::try_from(child.id()) {
        Ok(pid) => drop(killpg(Pid::from_raw(pid), Signal::SIGKILL)),
        Err(_) => drop(child.kill()),
    }
}

#[cfg(not(unix))]
fn kill_group(child: &mut Child) {
    drop(child.kill());
}

/// Waits for the child to exit, killing its group once the deadline passes.
fn wait_for_exit(
    step: &VerificationStep,
    child: &mut Child,
    started: Instant,
    timeout: Option<Duration>,
) -> Result<StepStatus, VerifierError> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(
                    target: COMMAND_TARGET,
                    command = %step,
                    ?status,
                    elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "verification process exited"
                );
                if status.success() {
                    return Ok(StepStatus::Succeeded);
                }
                return Ok(StepStatus::Failed {
                    code: status.code(),
                });
            }
            Ok(None) => {
                if let Some(limit) = timeout.filter(|limit| started.elapsed() > *limit) {
                    warn!(
                        target: COMMAND_TARGET,
                        command = %step,
                        timeout_secs = limit.as_secs(),
                        "verification process timed out, killing its process group"
                    );
                    kill_group(child);
                    drop(child.wait());
                    return Ok(StepStatus::TimedOut { after: limit });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(err) => {
                return Err(VerifierError::Wait {
                    program: step.program().to_owned(),
                    source: Arc::new(err),
                });
            }
        }
    }
}
