//! Output sinks.
//!
//! The rendered text goes to exactly one [`Sink`]. Files are opened only when
//! the pipeline reaches its writing stage, so an earlier failure never
//! truncates an existing output file.

use crate::error::CrudilizeError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Destination for rendered output.
pub trait Sink {
    /// Human-readable name used in error messages.
    fn name(&self) -> String;

    /// Writes all of `bytes`.
    ///
    /// # Errors
    ///
    /// Propagates the underlying I/O error.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Flushes everything written so far. Files are also synced to disk.
    ///
    /// # Errors
    ///
    /// Propagates the underlying I/O error.
    fn close(&mut self) -> io::Result<()>;
}

/// Standard output.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn name(&self) -> String {
        "<stdout>".to_string()
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        io::stdout().lock().write_all(bytes)
    }

    fn close(&mut self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}

/// A file created (or truncated) on open.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// # Errors
    ///
    /// Returns `CrudilizeError::Io` if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, CrudilizeError> {
        let file: File = File::create(path).map_err(|e| CrudilizeError::io(path.display(), e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }
}

impl Sink for FileSink {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)
    }

    fn close(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()
    }
}

/// In-memory sink, handy for embedding and tests.
impl Sink for Vec<u8> {
    fn name(&self) -> String {
        "<memory>".to_string()
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes `text` to `sink` and closes it.
///
/// # Errors
///
/// Returns `CrudilizeError::Io` naming the sink if either step fails.
pub fn write_output(text: &str, sink: &mut dyn Sink) -> Result<(), CrudilizeError> {
    sink.write(text.as_bytes())
        .and_then(|()| sink.close())
        .map_err(|e| CrudilizeError::io(sink.name(), e))?;
    tracing::debug!(sink = %sink.name(), bytes = text.len(), "output written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct BrokenSink;

    impl Sink for BrokenSink {
        fn name(&self) -> String {
            "broken".to_string()
        }

        fn write(&mut self, _bytes: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }

        fn close(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn memory_sink_collects_text_once() {
        let mut sink: Vec<u8> = Vec::new();
        write_output("hello\n", &mut sink).unwrap();
        assert_eq!(sink, b"hello\n");
    }

    #[test]
    fn file_sink_truncates_existing_file() {
        let dir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("out.js");
        fs::write(&path, "a much longer previous content").unwrap();

        let mut sink = FileSink::create(&path).unwrap();
        write_output("short", &mut sink).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "short");
    }

    #[test]
    fn file_sink_in_missing_directory_fails_on_create() {
        let dir = TempDir::new().unwrap();
        let err = FileSink::create(&dir.path().join("nope").join("out.js")).unwrap_err();
        assert!(matches!(err, CrudilizeError::Io { .. }));
    }

    #[test]
    fn write_failure_names_the_sink() {
        let err = write_output("x", &mut BrokenSink).unwrap_err();
        assert_eq!(err.to_string(), "broken: pipe closed");
    }
}
