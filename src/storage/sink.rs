//! Byte sink backends.

use crate::config::Placement;
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

/// An acquired sink, valid for one write call.
///
/// Dropping the handle releases the underlying resource.
pub trait SinkHandle {
    /// Write one record into the slot at `offset`.
    ///
    /// Returns the number of bytes the sink accepted, which may be less than
    /// `bytes.len()`.
    fn write_record(&mut self, offset: u64, bytes: &[u8]) -> Result<usize>;
}

/// A persistent, append-capable destination for hex records.
pub trait ByteSink: Send + Sync {
    /// Acquire the sink for one write call.
    ///
    /// Fails with [`Error::SinkUnavailable`] if the store cannot be opened.
    fn acquire(&self) -> Result<Box<dyn SinkHandle + '_>>;

    /// How this sink places records.
    fn placement(&self) -> Placement;

    /// Name of this backend (for logging).
    fn name(&self) -> &'static str;
}

fn slot_position(base: u64, offset: u64) -> Result<u64> {
    base.checked_add(offset).ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("slot offset {} past base {} overflows", offset, base),
        ))
    })
}

/// Sink backed by a file on disk, reopened for every write call.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    placement: Placement,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, placement: Placement) -> Self {
        Self {
            path: path.into(),
            placement,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    fn open(&self) -> std::io::Result<File> {
        let mut options = OpenOptions::new();
        options.create(true);
        match self.placement {
            Placement::Append => options.append(true),
            Placement::Stride => options.write(true),
        };
        options.open(&self.path)
    }
}

impl ByteSink for FileSink {
    fn acquire(&self) -> Result<Box<dyn SinkHandle + '_>> {
        let file = self.open().map_err(|source| {
            error!(
                path = %self.path.display(),
                error = %source,
                "couldn't open sink for writing"
            );
            Error::SinkUnavailable {
                path: self.path.clone(),
                source,
            }
        })?;

        let base = match self.placement {
            Placement::Append => 0,
            Placement::Stride => file.metadata()?.len(),
        };
        debug!(path = %self.path.display(), base, "sink acquired");

        Ok(Box::new(FileHandle {
            file,
            base,
            placement: self.placement,
        }))
    }

    fn placement(&self) -> Placement {
        self.placement
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

struct FileHandle {
    file: File,
    base: u64,
    placement: Placement,
}

impl SinkHandle for FileHandle {
    fn write_record(&mut self, offset: u64, bytes: &[u8]) -> Result<usize> {
        if bytes.is_empty() {
            return Ok(0);
        }
        // Append mode ignores the slot offset; the OS places bytes at EOF.
        if self.placement == Placement::Stride {
            let position = slot_position(self.base, offset)?;
            self.file.seek(SeekFrom::Start(position))?;
        }
        Ok(self.file.write(bytes)?)
    }
}

/// Sink held in memory.
///
/// Clones share the same contents. Availability and a per-record write
/// limit can be toggled to exercise failure paths.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    data: Arc<Mutex<Vec<u8>>>,
    unavailable: Arc<AtomicBool>,
    placement: Placement,
    write_limit: Option<usize>,
}

impl MemorySink {
    pub fn new(placement: Placement) -> Self {
        Self {
            placement,
            ..Self::default()
        }
    }

    /// Accept at most `limit` bytes of each record.
    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Make subsequent acquisitions fail (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Contents as text, with invalid UTF-8 replaced.
    pub fn contents_lossy(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl ByteSink for MemorySink {
    fn acquire(&self) -> Result<Box<dyn SinkHandle + '_>> {
        if self.unavailable.load(Ordering::SeqCst) {
            error!("memory sink unavailable");
            return Err(Error::SinkUnavailable {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "sink disabled"),
            });
        }
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        let base = data.len() as u64;
        Ok(Box::new(MemoryHandle {
            data,
            base,
            placement: self.placement,
            write_limit: self.write_limit,
        }))
    }

    fn placement(&self) -> Placement {
        self.placement
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

struct MemoryHandle<'a> {
    data: MutexGuard<'a, Vec<u8>>,
    base: u64,
    placement: Placement,
    write_limit: Option<usize>,
}

impl SinkHandle for MemoryHandle<'_> {
    fn write_record(&mut self, offset: u64, bytes: &[u8]) -> Result<usize> {
        let n = self.write_limit.map_or(bytes.len(), |l| l.min(bytes.len()));
        let start = match self.placement {
            Placement::Append => self.data.len(),
            Placement::Stride => {
                let position = slot_position(self.base, offset)?;
                usize::try_from(position).map_err(|_| {
                    Error::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("slot position {} does not fit in memory", position),
                    ))
                })?
            }
        };
        let end = start.checked_add(n).ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "record end overflows",
            ))
        })?;
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(&bytes[..n]);
        Ok(n)
    }
}
