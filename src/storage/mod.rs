//! Persistent byte sink for rendered hex records.
//!
//! This module handles:
//! - Scoped acquisition of the sink for the duration of one write call
//! - Slot placement of records (append or fixed stride)
//! - An in-memory sink for embedding and tests

mod sink;

pub use sink::{ByteSink, FileSink, MemorySink, SinkHandle};
