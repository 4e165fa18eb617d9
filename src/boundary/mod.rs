//! Trust boundary between caller buffers and service-owned memory.
//!
//! Everything a caller hands in is treated as raw, untrusted bytes. The only
//! way in is [`ingest`], which validates the requested length, allocates an
//! owned buffer and reports how much of it the caller actually filled.

mod copy;

pub use copy::{ingest, CopySource, IngestBuffer};
