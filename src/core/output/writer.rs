//! Append-only detail table writer

use super::csv_writer;
use super::row::Row;
use crate::core::keys::SequenceAllocator;
use crate::domain::{CdwError, Result, SurrogateKey};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

type Sink = csv::Writer<Box<dyn Write + Send>>;

/// Output sink for one detail table
///
/// The writer owns the sequence that mints the table's primary keys. Rows are
/// appended under a per-table lock, so concurrent callers never interleave
/// lines. The writer is flushed and closed on every exit path: explicitly via
/// [`close`](Self::close), or on drop.
pub struct DetailTableWriter {
    name: String,
    path: Option<PathBuf>,
    columns: usize,
    sequence: SequenceAllocator,
    sink: Mutex<Option<Sink>>,
    rows_written: AtomicU64,
}

impl DetailTableWriter {
    /// Creates the table file at `path` and writes its header line
    ///
    /// # Errors
    ///
    /// Returns [`CdwError::Setup`] if the file cannot be created or the header
    /// cannot be written.
    pub fn open(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        header: &[&str],
        key_start: u64,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| CdwError::setup(path.display().to_string(), e))?;
        let writer = Self::with_sink(name, path, Box::new(file), header, key_start)
            .map_err(|e| CdwError::setup(path.display().to_string(), e))?;

        debug!(table = %writer.name, path = %path.display(), "Opened detail table");
        Ok(writer)
    }

    /// Creates a writer that discards everything written to it
    ///
    /// Keys are still allocated, which makes this suitable for dry runs.
    pub fn discarding(name: impl Into<String>, header: &[&str], key_start: u64) -> Self {
        let name = name.into();
        let mut sink = csv_writer(Box::new(io::sink()) as Box<dyn Write + Send>);
        // io::sink never fails
        let _ = sink.write_record(header);
        Self {
            name,
            path: None,
            columns: header.len(),
            sequence: SequenceAllocator::starting_at(key_start),
            sink: Mutex::new(Some(sink)),
            rows_written: AtomicU64::new(0),
        }
    }

    fn with_sink(
        name: impl Into<String>,
        path: &Path,
        sink: Box<dyn Write + Send>,
        header: &[&str],
        key_start: u64,
    ) -> std::result::Result<Self, csv::Error> {
        let mut sink = csv_writer(sink);
        sink.write_record(header)?;
        sink.flush()?;
        Ok(Self {
            name: name.into(),
            path: Some(path.to_path_buf()),
            columns: header.len(),
            sequence: SequenceAllocator::starting_at(key_start),
            sink: Mutex::new(Some(sink)),
            rows_written: AtomicU64::new(0),
        })
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File backing this table, `None` for a discarding writer
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Allocates the table's next primary key
    pub fn next_key(&self) -> SurrogateKey {
        self.sequence.allocate()
    }

    /// Key the next [`next_key`](Self::next_key) call would return
    pub fn peek_key(&self) -> SurrogateKey {
        self.sequence.peek()
    }

    /// Rows appended so far, excluding the header
    pub fn rows_written(&self) -> u64 {
        self.rows_written.load(Ordering::Relaxed)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Sink>>> {
        self.sink
            .lock()
            .map_err(|_| CdwError::write(&self.name, "writer lock poisoned"))
    }

    /// Appends one complete line
    ///
    /// # Errors
    ///
    /// Returns [`CdwError::Write`] if the row does not match the header width,
    /// the table is closed, or the underlying write fails.
    pub fn append_row(&self, row: Row) -> Result<()> {
        if row.len() != self.columns {
            return Err(CdwError::write(
                &self.name,
                format!("row has {} fields, header has {}", row.len(), self.columns),
            ));
        }

        let mut guard = self.lock()?;
        let sink = guard
            .as_mut()
            .ok_or_else(|| CdwError::write(&self.name, "table is closed"))?;
        sink.write_record(row.fields())
            .map_err(|e| CdwError::write(&self.name, e))?;
        self.rows_written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Flushes buffered lines to the file
    pub fn flush(&self) -> Result<()> {
        let mut guard = self.lock()?;
        if let Some(sink) = guard.as_mut() {
            sink.flush().map_err(|e| CdwError::write(&self.name, e))?;
        }
        Ok(())
    }

    /// Flushes and closes the table; later appends fail
    pub fn close(&self) -> Result<()> {
        let mut guard = self.lock()?;
        if let Some(mut sink) = guard.take() {
            sink.flush().map_err(|e| CdwError::write(&self.name, e))?;
        }
        Ok(())
    }
}

impl Drop for DetailTableWriter {
    fn drop(&mut self) {
        let sink = match self.sink.get_mut() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(mut sink) = sink.take() {
            if let Err(e) = sink.flush() {
                warn!(table = %self.name, error = %e, "Failed to flush detail table on drop");
            }
        }
    }
}

impl std::fmt::Debug for DetailTableWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailTableWriter")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("next_key", &self.sequence.peek())
            .field("rows_written", &self.rows_written())
            .finish()
    }
}
