//! Append-only log file used as the tracing writer.
//!
//! Each event takes the sink lock for the duration of its write, so lines
//! from concurrent tasks never interleave, and is synced to disk when the
//! writer is released.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

/// Shared handle to the log file. Cheap to clone.
#[derive(Clone)]
pub struct FileLogSink {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl FileLogSink {
    /// Open (create if missing) in append mode.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one raw line, bypassing tracing.
    pub fn append(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer();
        writer.write_all(line.as_bytes())?;
        if !line.ends_with('\n') {
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }

    /// Flush and sync everything written so far.
    pub fn flush(&self) -> io::Result<()> {
        let mut file = self.lock();
        file.flush()?;
        file.sync_all()
    }

    /// Guard that flushes the sink when dropped.
    pub fn guard(&self) -> LogSinkGuard {
        LogSinkGuard { sink: self.clone() }
    }

    fn writer(&self) -> SinkWriter<'_> {
        SinkWriter { file: self.lock() }
    }

    fn lock(&self) -> MutexGuard<'_, File> {
        self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<'a> MakeWriter<'a> for FileLogSink {
    type Writer = SinkWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer()
    }
}

/// Exclusive writer for one event.
pub struct SinkWriter<'a> {
    file: MutexGuard<'a, File>,
}

impl Write for SinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.sync_data()
    }
}

impl Drop for SinkWriter<'_> {
    fn drop(&mut self) {
        let _ = self.file.sync_data();
    }
}

/// Flushes and syncs the log file on every exit path.
pub struct LogSinkGuard {
    sink: FileLogSink,
}

impl LogSinkGuard {
    /// Explicit close for the normal exit path; drop does the same.
    pub fn close(self) -> io::Result<()> {
        self.sink.flush()
    }
}

impl Drop for LogSinkGuard {
    fn drop(&mut self) {
        let _ = self.sink.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.log");
        std::fs::write(&path, "earlier run\n").unwrap();

        let sink = FileLogSink::open(&path).unwrap();
        sink.append("started").unwrap();
        sink.guard().close().unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "earlier run\nstarted\n"
        );
    }

    #[test]
    fn test_open_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileLogSink::open(dir.path().join("missing/relay.log"));
        assert!(err.is_err());
    }

    #[test]
    fn test_concurrent_writers_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.log");
        let sink = FileLogSink::open(&path).unwrap();

        let threads: Vec<_> = (0..8)
            .map(|t| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let mut w = sink.make_writer();
                        // Two writes per line: a torn line would show up if the
                        // lock were not held across both.
                        w.write_all(format!("thread-{t} ").as_bytes()).unwrap();
                        w.write_all(format!("line-{i}\n").as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 400);
        for line in lines {
            let mut parts = line.split(' ');
            assert!(parts.next().unwrap().starts_with("thread-"));
            assert!(parts.next().unwrap().starts_with("line-"));
            assert!(parts.next().is_none());
        }
    }
}
