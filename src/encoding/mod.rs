//! Hex dump encoding of ingested payloads.
//!
//! A payload is cut into fixed-width chunks and every chunk is rendered as
//! one text record of space-separated, zero-padded lowercase hex pairs.

mod records;

pub use records::{encode, encode_to_string, record_count, render_byte, HexRecord, Records};
