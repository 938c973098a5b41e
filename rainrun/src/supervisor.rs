use std::io::Read;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};
use tracing::{debug, info, warn};

use crate::launch::command_to_string;

/// Interval between "still running" log lines.
const HEARTBEAT: Duration = Duration::from_secs(30);

/// Poll cadence while inside the startup grace window.
const STARTUP_POLL: Duration = Duration::from_millis(20);

const RSS_SAMPLE_EVERY: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub(crate) struct RunOutput {
    pub(crate) status: ExitStatus,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
    pub(crate) elapsed: Duration,
    pub(crate) peak_rss_bytes: u64,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum SupervisorError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("benchmark process failed to start ({status})\n--- stderr (tail) ---\n{stderr_tail}")]
    FailedToStart {
        status: ExitStatus,
        stderr_tail: String,
    },

    #[error("benchmark process still running after {0:?}; killed")]
    TimedOut(Duration),

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        source: std::io::Error,
    },
}

fn io_err(context: &'static str) -> impl FnOnce(std::io::Error) -> SupervisorError {
    move |source| SupervisorError::Io { context, source }
}

/// Launches one benchmark process and blocks until it is gone.
#[derive(Debug, Clone)]
pub(crate) struct Supervisor {
    poll_interval: Duration,
    startup_grace: Duration,
    timeout: Option<Duration>,
}

impl Supervisor {
    pub(crate) fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval: poll_interval.max(Duration::from_millis(1)),
            startup_grace: Duration::from_secs(2),
            timeout: None,
        }
    }

    pub(crate) fn startup_grace(mut self, grace: Duration) -> Self {
        self.startup_grace = grace;
        self
    }

    pub(crate) fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs `cmd` to completion and returns everything it printed.
    ///
    /// A failure exit observed within the startup grace window is reported
    /// as [`SupervisorError::FailedToStart`]; a failure exit after that still
    /// yields the output so the report can be inspected.
    pub(crate) fn run(&self, mut cmd: Command) -> Result<RunOutput, SupervisorError> {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        // Own process group so a timeout also takes down whatever a wrapper
        // script forked.
        #[cfg(unix)]
        cmd.process_group(0);

        let program = cmd.get_program().to_string_lossy().into_owned();
        info!(command = %command_to_string(&cmd), "launching benchmark");

        let started = Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|source| SupervisorError::Spawn { program, source })?;
        info!(pid = child.id(), "benchmark running");

        let collectors = match Collectors::start(&mut child) {
            Ok(c) => c,
            Err(e) => {
                kill(&mut child);
                return Err(e);
            }
        };

        let (status, exited_after) = match self.wait(&mut child, started) {
            Ok(waited) => waited,
            Err(e) => {
                kill(&mut child);
                collectors.abandon();
                return Err(e);
            }
        };
        let (stdout, stderr, peak_rss_bytes) = collectors.finish()?;

        if !status.success() && exited_after < self.startup_grace {
            return Err(SupervisorError::FailedToStart {
                status,
                stderr_tail: tail_lines(&stderr, 12),
            });
        }

        if status.success() {
            info!(%status, "benchmark exited");
        } else {
            warn!(%status, "benchmark exited with a failure status; its report is still parsed");
        }

        Ok(RunOutput {
            status,
            stdout,
            stderr,
            elapsed: started.elapsed(),
            peak_rss_bytes,
        })
    }

    fn wait(
        &self,
        child: &mut Child,
        started: Instant,
    ) -> Result<(ExitStatus, Duration), SupervisorError> {
        let mut next_heartbeat = HEARTBEAT;

        loop {
            let elapsed = started.elapsed();
            if let Some(status) = child.try_wait().map_err(io_err("poll benchmark status"))? {
                return Ok((status, elapsed));
            }

            if let Some(timeout) = self.timeout
                && elapsed >= timeout
            {
                warn!(timeout = %humantime::format_duration(timeout), "timeout reached; killing benchmark");
                return Err(SupervisorError::TimedOut(timeout));
            }

            if elapsed >= next_heartbeat {
                info!(
                    elapsed = %humantime::format_duration(round_secs(elapsed)),
                    "benchmark still running"
                );
                next_heartbeat += HEARTBEAT;
            } else {
                debug!(elapsed_ms = elapsed.as_millis() as u64, "benchmark still running");
            }

            let mut step = if elapsed < self.startup_grace {
                self.poll_interval.min(STARTUP_POLL)
            } else {
                self.poll_interval
            };
            if let Some(timeout) = self.timeout {
                step = step.min(timeout.saturating_sub(elapsed));
            }
            thread::sleep(step);
        }
    }
}

/// Background threads draining the child's pipes and sampling its RSS.
struct Collectors {
    stop: Arc<AtomicBool>,
    peak: Arc<AtomicU64>,
    sampler: JoinHandle<()>,
    stdout: JoinHandle<std::io::Result<String>>,
    stderr: JoinHandle<std::io::Result<String>>,
}

impl Collectors {
    fn start(child: &mut Child) -> Result<Self, SupervisorError> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| missing_pipe("benchmark stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| missing_pipe("benchmark stderr"))?;

        let stop = Arc::new(AtomicBool::new(false));
        let peak = Arc::new(AtomicU64::new(0));
        let sampler = spawn_rss_sampler(child.id(), Arc::clone(&stop), Arc::clone(&peak));

        Ok(Self {
            stop,
            peak,
            sampler,
            stdout: thread::spawn(move || read_lossy(stdout)),
            stderr: thread::spawn(move || read_lossy(stderr)),
        })
    }

    fn finish(self) -> Result<(String, String, u64), SupervisorError> {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.sampler.join();

        let stdout = join_reader(self.stdout, "read benchmark stdout")?;
        let stderr = join_reader(self.stderr, "read benchmark stderr")?;

        Ok((stdout, stderr, self.peak.load(Ordering::Relaxed)))
    }

    /// Stops sampling and detaches the readers. A process that escaped the
    /// kill may still hold the pipes; the readers end when it does.
    fn abandon(self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn join_reader(
    handle: JoinHandle<std::io::Result<String>>,
    context: &'static str,
) -> Result<String, SupervisorError> {
    handle
        .join()
        .map_err(|_| SupervisorError::Io {
            context,
            source: std::io::Error::other("reader thread panicked"),
        })?
        .map_err(io_err(context))
}

fn missing_pipe(what: &'static str) -> SupervisorError {
    SupervisorError::Io {
        context: what,
        source: std::io::Error::other("pipe was not captured"),
    }
}

fn spawn_rss_sampler(pid: u32, stop: Arc<AtomicBool>, peak: Arc<AtomicU64>) -> JoinHandle<()> {
    thread::spawn(move || {
        let pid = Pid::from_u32(pid);
        let refresh = RefreshKind::nothing().with_processes(ProcessRefreshKind::everything());
        let mut sys = System::new_with_specifics(refresh);

        while !stop.load(Ordering::Relaxed) {
            sys.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                ProcessRefreshKind::everything(),
            );
            if let Some(p) = sys.process(pid) {
                update_max(&peak, p.memory());
            }

            thread::sleep(RSS_SAMPLE_EVERY);
        }
    })
}

fn update_max(cur: &AtomicU64, candidate: u64) {
    let mut existing = cur.load(Ordering::Relaxed);
    while candidate > existing {
        match cur.compare_exchange(existing, candidate, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return,
            Err(v) => existing = v,
        }
    }
}

fn kill(child: &mut Child) {
    #[cfg(unix)]
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: signals only the group created for this child at spawn.
        unsafe {
            libc::killpg(pgid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn read_lossy<R: Read>(mut r: R) -> std::io::Result<String> {
    let mut buf = Vec::new();
    r.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub(crate) fn round_secs(d: Duration) -> Duration {
    Duration::from_secs(d.as_secs())
}

pub(crate) fn tail_lines(s: &str, n: usize) -> String {
    let mut lines: Vec<&str> = s.lines().rev().take(n).collect();
    lines.reverse();
    lines.join("\n")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script).stdin(Stdio::null());
        cmd
    }

    fn fast() -> Supervisor {
        Supervisor::new(Duration::from_millis(10)).startup_grace(Duration::from_millis(500))
    }

    #[test]
    fn returns_output_after_clean_exit() {
        let out = fast()
            .run(sh("echo '[TRACK: a] starting load scheduler'; echo warming >&2"))
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(out.status.success());
        assert!(out.stdout.contains("[TRACK: a] starting load scheduler"));
        assert!(out.stderr.contains("warming"));
    }

    #[test]
    fn early_failure_is_a_failed_start() {
        let err = match fast().run(sh("echo 'no such class' >&2; exit 3")) {
            Ok(out) => panic!("expected failed start, got {:?}", out.status),
            Err(e) => e,
        };
        match err {
            SupervisorError::FailedToStart {
                status,
                stderr_tail,
            } => {
                assert_eq!(status.code(), Some(3));
                assert!(stderr_tail.contains("no such class"));
            }
            other => panic!("expected FailedToStart, got {other:?}"),
        }
    }

    #[test]
    fn failure_after_startup_still_returns_output() {
        let sup = Supervisor::new(Duration::from_millis(10)).startup_grace(Duration::from_millis(50));
        let out = sup
            .run(sh("echo partial; sleep 0.3; exit 2"))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(out.status.code(), Some(2));
        assert_eq!(out.stdout.trim(), "partial");
        assert!(out.elapsed >= Duration::from_millis(300));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let cmd = Command::new("/nonexistent/rainrun-test-java");
        assert!(matches!(
            fast().run(cmd),
            Err(SupervisorError::Spawn { .. })
        ));
    }

    #[test]
    fn timeout_kills_the_child() {
        let started = Instant::now();
        let sup = fast().timeout(Some(Duration::from_millis(150)));
        assert!(matches!(
            sup.run(sh("exec sleep 10")),
            Err(SupervisorError::TimedOut(_))
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn timeout_kills_processes_forked_by_the_child() {
        let started = Instant::now();
        let sup = fast().timeout(Some(Duration::from_millis(200)));
        assert!(matches!(
            sup.run(sh("sleep 6; echo done")),
            Err(SupervisorError::TimedOut(_))
        ));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn panicked_reader_is_an_io_error() {
        let handle = thread::spawn(|| -> std::io::Result<String> { panic!("reader died") });
        match join_reader(handle, "read benchmark stdout") {
            Err(SupervisorError::Io { context, .. }) => {
                assert_eq!(context, "read benchmark stdout");
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn large_output_does_not_block_the_child() {
        let out = fast()
            .run(sh("yes 'scoreboard line' | head -n 200000"))
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(out.status.success());
        assert_eq!(out.stdout.lines().count(), 200_000);
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail_lines("a\nb\nc\nd", 2), "c\nd");
        assert_eq!(tail_lines("a", 5), "a");
    }
}
