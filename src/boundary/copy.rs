//! Bounds-checked copy of caller bytes into an owned ingest buffer.

use crate::error::{Error, Result};
use tracing::{debug, warn};

/// A caller-side byte source.
///
/// Implementations copy as many bytes as they can into `dst` and report the
/// count. Copying fewer than `dst.len()` bytes is not an error at this level;
/// [`ingest`] records the shortfall.
pub trait CopySource {
    /// Copy up to `dst.len()` bytes into `dst`, returning the number copied.
    fn copy_to(&self, dst: &mut [u8]) -> usize;
}

impl CopySource for [u8] {
    fn copy_to(&self, dst: &mut [u8]) -> usize {
        let n = self.len().min(dst.len());
        dst[..n].copy_from_slice(&self[..n]);
        n
    }
}

impl<const N: usize> CopySource for [u8; N] {
    fn copy_to(&self, dst: &mut [u8]) -> usize {
        self.as_slice().copy_to(dst)
    }
}

impl CopySource for Vec<u8> {
    fn copy_to(&self, dst: &mut [u8]) -> usize {
        self.as_slice().copy_to(dst)
    }
}

/// Owned copy of the bytes of one write call.
///
/// Bytes the source could not supply stay zeroed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestBuffer {
    data: Vec<u8>,
    copied: usize,
}

impl IngestBuffer {
    /// The buffered bytes, `len()` long.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Requested length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes actually supplied by the source.
    pub fn copied(&self) -> usize {
        self.copied
    }

    /// Bytes the source failed to supply.
    pub fn shortfall(&self) -> usize {
        self.data.len() - self.copied
    }

    pub fn is_complete(&self) -> bool {
        self.copied == self.data.len()
    }

    /// Fail with [`Error::Copy`] unless every requested byte was copied.
    pub fn require_complete(&self) -> Result<()> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(Error::Copy {
                requested: self.data.len(),
                copied: self.copied,
            })
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

/// Copy `length` bytes from `source` into a freshly allocated buffer.
///
/// Lengths above `max_len` are rejected with [`Error::CapacityExceeded`]
/// before anything is allocated. A zero `length` yields an empty buffer.
/// An incomplete copy is logged and returned; callers decide whether to
/// enforce it via [`IngestBuffer::require_complete`].
pub fn ingest<S: CopySource + ?Sized>(
    source: &S,
    length: usize,
    max_len: usize,
) -> Result<IngestBuffer> {
    if length > max_len {
        return Err(Error::CapacityExceeded {
            requested: length,
            max: max_len,
        });
    }

    let mut data = vec![0u8; length];
    let copied = source.copy_to(&mut data).min(length);
    let buffer = IngestBuffer { data, copied };

    if buffer.is_complete() {
        debug!(bytes = length, "copied bytes from caller");
    } else {
        warn!(
            requested = length,
            copied,
            missing = buffer.shortfall(),
            "could not copy all bytes from caller"
        );
    }

    Ok(buffer)
}
