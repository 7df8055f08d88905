use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::warn;

/// Sink for pre-formatted, human-readable lines.
pub trait Journal: Send + Sync {
    fn record(&self, line: &str);
}

/// Appends every line to a file and echoes it to stdout.
///
/// The parent directory is created and the file opened on the first write;
/// the handle is then kept for later lines. A failed write is reported
/// through tracing and drops the handle, so the next line reopens the file.
/// A full disk never stops message handling.
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    fn open(&self) -> std::io::Result<File> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        OpenOptions::new().create(true).append(true).open(&self.path)
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut slot = self
            .file
            .lock()
            .map_err(|_| std::io::Error::other("log file lock poisoned"))?;
        if slot.is_none() {
            *slot = Some(self.open()?);
        }
        let written = match slot.as_mut() {
            Some(file) => writeln!(file, "{line}"),
            None => Ok(()),
        };
        if written.is_err() {
            *slot = None;
        }
        written
    }
}

impl Journal for LogFile {
    fn record(&self, line: &str) {
        if let Err(e) = self.append(line) {
            warn!(path = %self.path.display(), "Failed to append to log file: {e}");
        }
        println!("{line}");
    }
}

/// Keeps lines in memory. Used where the output needs inspecting.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    lines: Mutex<Vec<String>>,
}

impl MemoryJournal {
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl Journal for MemoryJournal {
    fn record(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}
