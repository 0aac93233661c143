//! Output resolution: selects the byte sink records are written to.
//!
//! # Responsibilities
//! - Map the configured writer to stderr, stdout or a log file
//! - Prepare the log directory for file output
//!
//! # Design Decisions
//! - File output starts fresh on every run: the directory is removed and
//!   recreated, and `all.log` is truncated
//! - Each record is written with one `write_all` under the sink's lock, so
//!   concurrent records never interleave inside a line
//! - Setup failures are returned, not panicked on

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::{Config, Writer};
use crate::error::SetupError;

/// Directory used when `out_path` is empty.
pub const DEFAULT_DIR: &str = "logs";

/// File name inside the log directory.
pub const LOG_FILE: &str = "all.log";

/// A shared, lock-guarded byte sink.
#[derive(Clone)]
pub struct Output {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Output {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// An in-memory sink and a handle to read back what was written.
    pub fn buffer() -> (Self, SharedBuffer) {
        let buf = SharedBuffer::default();
        (Self::new(buf.clone()), buf)
    }

    /// Write one encoded record as a single unit.
    pub fn write_record(&self, bytes: &[u8]) -> io::Result<()> {
        let mut w = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("output lock poisoned"))?;
        w.write_all(bytes)?;
        w.flush()
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output").finish_non_exhaustive()
    }
}

/// Growable byte buffer shared between an [`Output`] and a reader.
#[derive(Clone, Default, Debug)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().map(|b| b.is_empty()).unwrap_or(true)
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .0
            .lock()
            .map_err(|_| io::Error::other("buffer lock poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Resolve the sink for `config`.
pub fn open_output(config: &Config) -> Result<Output, SetupError> {
    match config.writer {
        Writer::Stderr => Ok(Output::stderr()),
        Writer::Stdout => Ok(Output::stdout()),
        Writer::File => {
            let dir = if config.out_path.is_empty() {
                Path::new(DEFAULT_DIR)
            } else {
                Path::new(&config.out_path)
            };
            Ok(Output::new(open_log_file(dir)?))
        }
    }
}

/// Recreate `dir` and open a truncated `all.log` inside it.
///
/// Whatever exists at `dir` is removed first, including a plain file.
pub fn open_log_file(dir: &Path) -> Result<File, SetupError> {
    let removed = match fs::symlink_metadata(dir) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(dir),
        Ok(_) => fs::remove_file(dir),
        Err(e) => Err(e),
    };
    match removed {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(SetupError::RemoveDir {
                path: dir.to_path_buf(),
                source,
            })
        }
    }

    fs::create_dir_all(dir).map_err(|source| SetupError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let path: PathBuf = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .map_err(|source| SetupError::OpenFile {
            path: path.clone(),
            source,
        })?;

    tracing::debug!(path = %path.display(), "Log file prepared");
    Ok(file)
}
