//! Hex Copy
//!
//! A single-session byte intake service. A caller opens a session, writes an
//! opaque payload, and the service appends a hexadecimal dump of that payload
//! to a persistent sink. Reading returns a short per-session status message.
//!
//! # Architecture
//!
//! ```text
//! open → write (Ingest → Encode → Sink) → read (status) → release
//! ```
//!
//! - [`session`]: single-slot admission (`Busy` while a session is active)
//! - [`boundary`]: validated copy of caller bytes into owned memory
//! - [`encoding`]: payload → lines of `%02x` pairs, 8 bytes per line
//! - [`storage`]: file and in-memory sinks, acquired once per write
//!
//! # Example
//!
//! ```rust,no_run
//! use hexcopy::{HexCopyService, ServiceConfig};
//!
//! let service = HexCopyService::with_file_sink(ServiceConfig::new("/tmp/output")).unwrap();
//!
//! service.open().unwrap();
//! service.write(b"Hidden data", 11).unwrap();
//! assert_eq!(service.read(64), b"Count 1\n");
//! service.release();
//! ```

pub mod boundary;
pub mod config;
pub mod encoding;
pub mod error;
pub mod service;
pub mod session;
pub mod storage;

pub use config::{Placement, ServiceConfig};
pub use error::{Error, Result};
pub use service::HexCopyService;
