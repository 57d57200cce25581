//! External programmer tool

use std::ffi::{OsStr, OsString};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running tool is polled for completion
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of one tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Whether the tool exited with status zero
    pub success: bool,
    /// Exit code, if the tool exited normally
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

/// An external flash programmer
///
/// An `Err` means the tool could not be run to completion (it failed to
/// start, or was killed after timing out). A tool that ran and failed
/// returns `Ok` with `success == false`.
pub trait ProgrammerTool {
    /// Query the connected flash device
    fn query(&mut self) -> io::Result<ToolOutput>;

    /// Write `image` to the connected flash device, which is a `part`
    fn write(&mut self, part: &str, image: &Path) -> io::Result<ToolOutput>;
}

/// The minipro command line programmer
#[derive(Debug, Clone)]
pub struct Minipro {
    program: PathBuf,
    leading_args: Vec<OsString>,
    timeout: Duration,
}

impl Minipro {
    /// Run the tool at `path`, killing it after `timeout`
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: path.into(),
            leading_args: Vec::new(),
            timeout,
        }
    }

    fn timed_out(&self) -> io::Error {
        io::Error::new(
            io::ErrorKind::TimedOut,
            format!("{} timed out", self.program.display()),
        )
    }

    fn run(&self, args: &[&OsStr]) -> io::Result<ToolOutput> {
        log::debug!("Running {} {:?}", self.program.display(), args);

        let mut child = Command::new(&self.program)
            .args(&self.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        // No deadline if the timeout is beyond what Instant can represent
        let deadline = Instant::now().checked_add(self.timeout);
        let expired = || deadline.is_some_and(|d| Instant::now() >= d);

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if expired() {
                log::error!(
                    "{} did not finish within {:?}, killing it",
                    self.program.display(),
                    self.timeout
                );
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.timed_out());
            }
            thread::sleep(POLL_INTERVAL);
        };

        // Processes left behind by the tool can hold the pipes open
        let (stdout, stderr) = match (collect(stdout, deadline), collect(stderr, deadline)) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                log::error!(
                    "{} exited but its output did not close within {:?}",
                    self.program.display(),
                    self.timeout
                );
                return Err(self.timed_out());
            }
        };

        let output = ToolOutput {
            success: status.success(),
            code: status.code(),
            stdout,
            stderr,
        };
        log::trace!("Tool output: {:?}", output);
        Ok(output)
    }
}

impl ProgrammerTool for Minipro {
    fn query(&mut self) -> io::Result<ToolOutput> {
        self.run(&[OsStr::new("-q")])
    }

    fn write(&mut self, part: &str, image: &Path) -> io::Result<ToolOutput> {
        self.run(&[
            OsStr::new("-p"),
            OsStr::new(part),
            OsStr::new("-w"),
            image.as_os_str(),
        ])
    }
}

/// Read a pipe to the end on a separate thread
fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Wait for a drained pipe until `deadline`
///
/// Returns `None` if the deadline passes first.
fn collect(rx: Option<Receiver<String>>, deadline: Option<Instant>) -> Option<String> {
    let Some(rx) = rx else {
        return Some(String::new());
    };

    let received = match deadline {
        Some(d) => rx.recv_timeout(d.saturating_duration_since(Instant::now())),
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(text) => Some(text),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}
