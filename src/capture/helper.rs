//! Capture helper process: location, launch, bounded wait and teardown

use log::{debug, warn};
use std::ffi::OsString;
use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Base name of the capture helper binary
pub const HELPER_NAME: &str = "keyprobe-helper";

/// Poll interval while waiting for the helper to exit
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[cfg(windows)]
const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;

/// Helper binary could not be found at any known location
#[derive(Debug, Error)]
#[error("capture helper `{name}` not found (searched: {})", display_paths(.searched))]
pub struct HelperNotFound {
    pub name: String,
    pub searched: Vec<PathBuf>,
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "PATH".to_string();
    }
    let mut shown: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    shown.push("PATH".to_string());
    shown.join(", ")
}

/// Platform file name of the helper, e.g. `keyprobe-helper.exe`
pub fn helper_file_name() -> String {
    format!("{}{}", HELPER_NAME, std::env::consts::EXE_SUFFIX)
}

/// Find the helper binary.
///
/// An explicit path is authoritative: when given, nothing else is searched.
/// Otherwise the directory of the running executable, the current directory
/// and `PATH` are tried in that order.
pub fn locate_helper(explicit: Option<&Path>) -> Result<PathBuf, HelperNotFound> {
    let name = helper_file_name();

    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(HelperNotFound {
            name,
            searched: vec![path.to_path_buf()],
        });
    }

    let mut searched = Vec::new();

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    if let Some(dir) = exe_dir {
        searched.push(dir.join(&name));
    }
    if let Ok(cwd) = std::env::current_dir() {
        searched.push(cwd.join(&name));
    }

    if let Some(found) = searched.iter().find(|p| p.is_file()) {
        return Ok(found.clone());
    }

    which::which(HELPER_NAME).map_err(|_| HelperNotFound { name, searched })
}

/// Text drained from the helper's pipes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelperOutputText {
    pub stdout: String,
    pub stderr: String,
}

/// How to launch the helper
#[derive(Debug, Clone)]
pub struct HelperCommand {
    program: PathBuf,
    args: Vec<OsString>,
    new_console: bool,
}

impl HelperCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            new_console: true,
        }
    }

    /// Extra arguments passed to the helper on every launch
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Give the helper its own console window (Windows only; ignored elsewhere)
    pub fn new_console(mut self, enabled: bool) -> Self {
        self.new_console = enabled;
        self
    }

    /// Start the helper with piped stdout/stderr
    pub fn spawn(&self) -> io::Result<HelperSession> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            if self.new_console {
                cmd.creation_flags(CREATE_NEW_CONSOLE);
            }
        }

        let mut child = cmd.spawn()?;
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());
        debug!("Helper started (pid {})", child.id());

        Ok(HelperSession {
            child,
            stdout,
            stderr,
            reaped: false,
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    match pipe {
        Some(mut pipe) => {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
            });
        }
        None => {
            let _ = tx.send(String::new());
        }
    }
    rx
}

/// A running helper process.
///
/// Dropping the session kills and reaps the process if it has not exited,
/// so no helper outlives the capture that started it.
pub struct HelperSession {
    child: Child,
    stdout: Receiver<String>,
    stderr: Receiver<String>,
    reaped: bool,
}

impl HelperSession {
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Wait for exit, giving up after `timeout`. `Ok(None)` means still running.
    pub fn wait_timeout(&mut self, timeout: Duration) -> io::Result<Option<ExitStatus>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.child.try_wait()? {
                self.reaped = true;
                return Ok(Some(status));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            thread::sleep(EXIT_POLL_INTERVAL.min(deadline - now));
        }
    }

    /// Force-terminate and reap. Safe to call on an exited process.
    pub fn kill(&mut self) {
        if self.reaped {
            return;
        }
        if let Err(e) = self.child.kill() {
            debug!("Helper kill (pid {}): {}", self.child.id(), e);
        }
        match self.child.wait() {
            Ok(_) => self.reaped = true,
            Err(e) => warn!("Failed to reap helper (pid {}): {}", self.child.id(), e),
        }
    }

    /// Collect whatever the helper wrote, waiting at most `grace` per pipe
    pub fn drain(&mut self, grace: Duration) -> HelperOutputText {
        HelperOutputText {
            stdout: recv_pipe(&self.stdout, grace, "stdout"),
            stderr: recv_pipe(&self.stderr, grace, "stderr"),
        }
    }
}

fn recv_pipe(rx: &Receiver<String>, grace: Duration, name: &str) -> String {
    match rx.recv_timeout(grace) {
        Ok(text) => text,
        Err(_) => {
            warn!("Helper {} not closed within {:?}; discarding", name, grace);
            String::new()
        }
    }
}

impl Drop for HelperSession {
    fn drop(&mut self) {
        self.kill();
    }
}

impl fmt::Debug for HelperSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperSession")
            .field("pid", &self.child.id())
            .field("reaped", &self.reaped)
            .finish()
    }
}
