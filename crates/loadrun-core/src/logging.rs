//! Full-run log file for orchestration and runner output.
//!
//! Every run gets a single append-only `run.log` inside its results
//! directory. Orchestration lines are timestamped; captured runner output is
//! written verbatim so the file reads like the console would have.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Filename of the full-run log inside the results directory.
pub const RUN_LOG_FILE: &str = "run.log";

/// Writer that appends to a run's `run.log`.
pub struct RunLogWriter {
    /// Buffered file writer (wrapped in Mutex for thread safety)
    writer: Mutex<BufWriter<File>>,

    /// Path to the log file
    path: PathBuf,
}

impl RunLogWriter {
    /// Open (or create) `run.log` inside the results directory, append mode.
    pub fn create(results_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = results_dir.as_ref().join(RUN_LOG_FILE);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let writer = BufWriter::new(file);

        Ok(Self {
            writer: Mutex::new(writer),
            path,
        })
    }

    /// Path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a timestamped orchestration line.
    pub fn line(&self, line: &str) -> std::io::Result<()> {
        let ts = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let mut writer = self.writer.lock().unwrap();
        writeln!(writer, "[{}] {}", ts, line)?;
        writer.flush()?;
        Ok(())
    }

    /// Append a section header separating phases.
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        let mut writer = self.writer.lock().unwrap();
        writeln!(writer, "==== {} ====", title)?;
        writer.flush()?;
        Ok(())
    }

    /// Append captured runner output verbatim.
    pub fn raw(&self, bytes: &[u8]) -> std::io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let mut writer = self.writer.lock().unwrap();
        writer.write_all(bytes)?;
        if !bytes.ends_with(b"\n") {
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Flush any buffered data to disk.
    pub fn flush(&self) -> std::io::Result<()> {
        let mut writer = self.writer.lock().unwrap();
        writer.flush()
    }
}

impl Drop for RunLogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
