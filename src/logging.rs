//! Console + append-only file logging
//!
//! Every log line goes to stderr and is appended to the run log, so a
//! failed run can be audited after the console is gone.

use chrono::{SecondsFormat, Utc};
use env_logger::{Env, Target};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Writer that duplicates output to stderr and an optional file
pub struct TeeWriter<W: Write> {
    console: W,
    file: Option<File>,
}

impl<W: Write> TeeWriter<W> {
    pub fn new(console: W, file: Option<File>) -> Self {
        Self { console, file }
    }
}

impl<W: Write> Write for TeeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // A broken console must not stop the audit log, and vice versa
        let console = self.console.write_all(buf);
        let file = match self.file.as_mut() {
            Some(f) => f.write_all(buf),
            None => Ok(()),
        };
        console.and(file).map(|_| buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let console = self.console.flush();
        let file = match self.file.as_mut() {
            Some(f) => f.flush(),
            None => Ok(()),
        };
        console.and(file)
    }
}

/// Open `path` for appending, creating it if needed
pub fn open_log(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global logger. Default level is `info`; `RUST_LOG` overrides.
///
/// If the log file cannot be opened, logging continues on the console only
/// and the error is returned alongside for the caller to report.
pub fn init(log_path: &Path) -> Option<io::Error> {
    let (file, open_error) = match open_log(log_path) {
        Ok(file) => (Some(file), None),
        Err(e) => (None, Some(e)),
    };

    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:<5}] {}",
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(TeeWriter::new(io::stderr(), file))))
        .try_init();

    open_error
}
