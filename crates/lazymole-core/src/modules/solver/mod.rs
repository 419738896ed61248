//! Launches the external connectivity solver and captures its console output.
//!
//! The solver pauses at startup until it receives one line on stdin. The
//! invoker waits for readiness, writes the acknowledgement exactly once and
//! then blocks until the process exits or the overall timeout expires.

mod pump;
mod readiness;

pub use readiness::{DEFAULT_SETTLE_DELAY, Readiness, ReadinessOutcome};

use super::traits::SolverRunner;
use crate::domain::{MoleError, MoleResult};
use pump::OutputPump;
use readiness::wait_for_readiness;
use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const DEFAULT_EXECUTABLE: &str = "lazymole";
pub const DEFAULT_SOLVER_TIMEOUT: Duration = Duration::from_secs(6 * 60 * 60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// How long output readers get to finish once the solver has been killed.
pub const OUTPUT_DRAIN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverSettings {
    pub readiness: Readiness,
    pub acknowledgement: String,
    /// Measured from process start; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub poll_interval: Duration,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            readiness: Readiness::default(),
            acknowledgement: "\n".to_string(),
            timeout: Some(DEFAULT_SOLVER_TIMEOUT),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapturedOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i32>,
}

impl CapturedOutput {
    pub fn from_stdout(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: Vec::new(),
            exit_code: Some(0),
        }
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Runs `<executable> [leading args...] <run-dir>` as a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSolver {
    executable: PathBuf,
    leading_args: Vec<OsString>,
    settings: SolverSettings,
}

impl ProcessSolver {
    pub fn new(executable: impl Into<PathBuf>, settings: SolverSettings) -> Self {
        Self {
            executable: executable.into(),
            leading_args: Vec::new(),
            settings,
        }
    }

    /// Adds an argument placed before the run directory, e.g. a script for an interpreter.
    pub fn leading_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    fn spawn(&self, run_dir: &Path) -> MoleResult<Child> {
        Command::new(&self.executable)
            .args(&self.leading_args)
            .arg(run_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| {
                MoleError::solver_invocation(
                    "RUN.SOLVER_SPAWN",
                    format!(
                        "failed to launch solver '{}': {}",
                        self.executable.display(),
                        source
                    ),
                )
            })
    }

    fn wait_for_exit(&self, child: &mut Child, limit: Option<Instant>) -> MoleResult<ExitStatus> {
        loop {
            let polled = child.try_wait().map_err(|source| {
                MoleError::solver_invocation(
                    "RUN.SOLVER_WAIT",
                    format!("failed to wait for solver process: {}", source),
                )
            })?;
            if let Some(status) = polled {
                return Ok(status);
            }

            if limit.is_some_and(|limit| Instant::now() >= limit) {
                warn!(
                    timeout_secs = self.timeout_secs(),
                    "solver exceeded its timeout, killing process"
                );
                return Err(MoleError::solver_timeout(
                    "RUN.SOLVER_TIMEOUT",
                    format!(
                        "solver '{}' did not finish within {:.1} s",
                        self.executable.display(),
                        self.timeout_secs()
                    ),
                ));
            }
            thread::sleep(self.settings.poll_interval);
        }
    }

    fn timeout_secs(&self) -> f64 {
        self.settings
            .timeout
            .map_or(f64::INFINITY, |timeout| timeout.as_secs_f64())
    }
}

impl SolverRunner for ProcessSolver {
    fn invoke(&self, run_dir: &Path) -> MoleResult<CapturedOutput> {
        info!(
            executable = %self.executable.display(),
            run_dir = %run_dir.display(),
            "Running analysis with {}",
            self.executable.display()
        );
        let started = Instant::now();
        // A deadline past what `Instant` can represent means no deadline.
        let limit = self
            .settings
            .timeout
            .and_then(|timeout| started.checked_add(timeout));
        let mut child = self.spawn(run_dir)?;

        let (Some(stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            kill_and_reap(&mut child);
            return Err(MoleError::internal(
                "RUN.SOLVER_PIPES",
                "solver process was spawned without piped stdio",
            ));
        };

        let (sender, receiver) = mpsc::channel();
        let stdout_pump = OutputPump::spawn("stdout", stdout, Some(sender));
        let stderr_pump = OutputPump::spawn("stderr", stderr, None);

        let outcome = wait_for_readiness(&self.settings.readiness, &receiver, limit);
        match outcome {
            ReadinessOutcome::PromptMissing => warn!(
                "solver prompt not observed before the readiness wait expired, acknowledging anyway"
            ),
            other => debug!(outcome = ?other, "solver readiness resolved"),
        }
        drop(receiver);

        if let Err(error) = send_acknowledgement(stdin, &self.settings.acknowledgement) {
            return Err(abort_run(&mut child, stdout_pump, error));
        }
        let status = match self.wait_for_exit(&mut child, limit) {
            Ok(status) => status,
            Err(error) => return Err(abort_run(&mut child, stdout_pump, error)),
        };

        let stdout = stdout_pump.drain(limit)?;
        let stderr = stderr_pump.drain(limit)?;
        if !(stdout.is_complete() && stderr.is_complete()) {
            warn!("solver exited but its output streams stayed open past the timeout");
            return Err(MoleError::solver_timeout(
                "RUN.SOLVER_TIMEOUT",
                format!(
                    "solver '{}' exited but its output was still open after {:.1} s",
                    self.executable.display(),
                    self.timeout_secs()
                ),
            )
            .with_captured_output(lossy_text(&stdout.into_bytes())));
        }
        let (stdout, stderr) = (stdout.into_bytes(), stderr.into_bytes());

        if !status.success() {
            warn!(status = %status, "solver exited unsuccessfully");
        }
        info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            stdout_bytes = stdout.len(),
            "solver finished"
        );

        Ok(CapturedOutput {
            stdout,
            stderr,
            exit_code: status.code(),
        })
    }
}

/// The process may already be gone, so kill and wait errors are ignored.
fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Stops the solver and attaches whatever stdout arrived within the drain grace.
fn abort_run(child: &mut Child, stdout: OutputPump, error: MoleError) -> MoleError {
    kill_and_reap(child);
    match stdout.drain(Some(Instant::now() + OUTPUT_DRAIN_GRACE)) {
        Ok(drained) => error.with_captured_output(lossy_text(&drained.into_bytes())),
        Err(_) => error,
    }
}

fn lossy_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn send_acknowledgement<W: Write>(mut stdin: W, acknowledgement: &str) -> MoleResult<()> {
    let written = stdin
        .write_all(acknowledgement.as_bytes())
        .and_then(|()| stdin.flush());
    match written {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == ErrorKind::BrokenPipe => {
            warn!("solver closed its input before the acknowledgement was sent");
            Ok(())
        }
        Err(source) => Err(MoleError::solver_invocation(
            "RUN.SOLVER_STDIN",
            format!("failed to send acknowledgement to solver: {}", source),
        )),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::{OutputPump, ProcessSolver, Readiness, SolverSettings, abort_run};
    use crate::domain::{MoleError, MoleErrorCategory};
    use crate::modules::traits::SolverRunner;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process::{Command, Stdio};
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn write_script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("solver.sh");
        fs::write(&path, body).expect("script should be written");
        path
    }

    fn sh_solver(script: &Path, settings: SolverSettings) -> ProcessSolver {
        ProcessSolver::new("/bin/sh", settings).leading_arg(script)
    }

    fn fast_settings(readiness: Readiness) -> SolverSettings {
        SolverSettings {
            readiness,
            timeout: Some(Duration::from_secs(30)),
            poll_interval: Duration::from_millis(10),
            ..SolverSettings::default()
        }
    }

    const INTERACTIVE_SOLVER: &str = r#"
echo "LazyMole run directory: $1"
echo "Press enter to continue..."
read answer
printf 'Minimum Hydraulic Resistance = 12.345\r\n'
printf 'Target ID = 7\r\n'
echo "diagnostics" 1>&2
"#;

    #[test]
    fn prompt_readiness_acknowledges_and_captures_stdout() {
        let temp = TempDir::new().expect("tempdir should be created");
        let script = write_script(temp.path(), INTERACTIVE_SOLVER);
        let solver = sh_solver(
            &script,
            fast_settings(Readiness::Prompt {
                marker: "Press enter".to_string(),
                max_wait: Duration::from_secs(10),
            }),
        );

        let started = Instant::now();
        let output = solver.invoke(temp.path()).expect("solver should run");

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(output.exit_code, Some(0));
        let stdout = output.stdout_text();
        assert!(stdout.contains(&format!("LazyMole run directory: {}", temp.path().display())));
        assert!(stdout.contains("Minimum Hydraulic Resistance = 12.345\r\n"));
        assert!(stdout.contains("Target ID = 7\r\n"));
        assert_eq!(String::from_utf8_lossy(&output.stderr), "diagnostics\n");
    }

    #[test]
    fn fixed_delay_readiness_still_acknowledges_once() {
        let temp = TempDir::new().expect("tempdir should be created");
        let script = write_script(
            temp.path(),
            "read first\necho \"first=[$first]\"\nif read second; then echo extra; fi\necho done\n",
        );
        let solver = sh_solver(
            &script,
            fast_settings(Readiness::FixedDelay(Duration::from_millis(50))),
        );

        let output = solver.invoke(temp.path()).expect("solver should run");
        assert_eq!(output.stdout_text(), "first=[]\ndone\n");
    }

    #[test]
    fn hung_solver_is_killed_after_timeout() {
        let temp = TempDir::new().expect("tempdir should be created");
        let script = write_script(temp.path(), "echo started\nexec sleep 30\n");
        let solver = sh_solver(
            &script,
            SolverSettings {
                readiness: Readiness::FixedDelay(Duration::from_millis(10)),
                timeout: Some(Duration::from_millis(300)),
                poll_interval: Duration::from_millis(10),
                ..SolverSettings::default()
            },
        );

        let started = Instant::now();
        let error = solver
            .invoke(temp.path())
            .expect_err("hung solver should time out");

        assert!(started.elapsed() < Duration::from_secs(20));
        assert_eq!(error.category(), MoleErrorCategory::SolverTimeout);
        assert_eq!(error.captured_output(), Some("started\n"));
    }

    #[test]
    fn solver_exiting_before_acknowledgement_is_not_an_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let script = write_script(temp.path(), "echo quick\nexit 3\n");
        let solver = sh_solver(
            &script,
            fast_settings(Readiness::FixedDelay(Duration::from_secs(10))),
        );

        let started = Instant::now();
        let output = solver.invoke(temp.path()).expect("early exit is still captured");

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout_text(), "quick\n");
    }

    #[test]
    fn missing_executable_is_a_solver_invocation_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let solver = ProcessSolver::new(
            temp.path().join("does-not-exist"),
            fast_settings(Readiness::FixedDelay(Duration::ZERO)),
        );

        let error = solver
            .invoke(temp.path())
            .expect_err("missing executable should fail");
        assert_eq!(error.category(), MoleErrorCategory::SolverInvocation);
        assert_eq!(error.code(), "RUN.SOLVER_SPAWN");
    }

    #[test]
    fn timeout_returns_even_when_a_grandchild_holds_stdout() {
        let temp = TempDir::new().expect("tempdir should be created");
        let script = write_script(temp.path(), "echo started\nsleep 6\necho after\n");
        let solver = sh_solver(
            &script,
            SolverSettings {
                readiness: Readiness::FixedDelay(Duration::from_millis(10)),
                timeout: Some(Duration::from_millis(300)),
                poll_interval: Duration::from_millis(10),
                ..SolverSettings::default()
            },
        );

        let started = Instant::now();
        let error = solver
            .invoke(temp.path())
            .expect_err("hung solver should time out");

        assert!(started.elapsed() < Duration::from_secs(4), "{:?}", started.elapsed());
        assert_eq!(error.category(), MoleErrorCategory::SolverTimeout);
        assert_eq!(error.captured_output(), Some("started\n"));
    }

    #[test]
    fn background_process_keeping_output_open_is_a_timeout() {
        let temp = TempDir::new().expect("tempdir should be created");
        let script = write_script(temp.path(), "echo done\nsleep 6 &\nexit 0\n");
        let solver = sh_solver(
            &script,
            SolverSettings {
                readiness: Readiness::FixedDelay(Duration::from_millis(10)),
                timeout: Some(Duration::from_millis(500)),
                poll_interval: Duration::from_millis(10),
                ..SolverSettings::default()
            },
        );

        let started = Instant::now();
        let error = solver
            .invoke(temp.path())
            .expect_err("open output should hit the timeout");

        assert!(started.elapsed() < Duration::from_secs(4), "{:?}", started.elapsed());
        assert_eq!(error.category(), MoleErrorCategory::SolverTimeout);
        assert_eq!(error.captured_output(), Some("done\n"));
    }

    #[test]
    fn unrepresentable_timeout_waits_without_a_deadline() {
        let temp = TempDir::new().expect("tempdir should be created");
        let script = write_script(temp.path(), "echo ok\n");
        let solver = sh_solver(
            &script,
            SolverSettings {
                readiness: Readiness::FixedDelay(Duration::MAX),
                timeout: Some(Duration::from_secs(u64::MAX)),
                poll_interval: Duration::from_millis(10),
                ..SolverSettings::default()
            },
        );

        let output = solver.invoke(temp.path()).expect("solver should run");
        assert_eq!(output.stdout_text(), "ok\n");
        assert_eq!(output.exit_code, Some(0));
    }

    #[test]
    fn aborting_kills_the_solver_and_keeps_partial_output() {
        let mut child = Command::new("/bin/sh")
            .arg("-c")
            .arg("echo partial; exec sleep 30")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("sh should launch");
        let stdout = child.stdout.take().expect("piped stdout");
        let pump = OutputPump::spawn("stdout", stdout, None);

        let started = Instant::now();
        let error = abort_run(
            &mut child,
            pump,
            MoleError::solver_invocation("RUN.SOLVER_STDIN", "acknowledgement failed"),
        );

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(child.try_wait().expect("status").is_some());
        assert_eq!(error.code(), "RUN.SOLVER_STDIN");
        assert_eq!(error.captured_output(), Some("partial\n"));
    }
}
