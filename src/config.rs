//! Configuration constants and types for the hex copy service.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default sink file.
pub const DEFAULT_SINK_PATH: &str = "/tmp/output";

/// Default number of payload bytes rendered per hex record.
pub const DEFAULT_BYTES_PER_RECORD: usize = 8;

/// Default slot width of one record in the sink (3 characters per byte).
pub const DEFAULT_RECORD_STRIDE: u64 = 24;

/// Default largest payload accepted by a single write.
pub const DEFAULT_MAX_WRITE_LEN: usize = 1000;

/// Rendered width of one byte: two hex digits plus a separator.
pub const CHARS_PER_BYTE: u64 = 3;

/// Where records land inside the sink file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Records are appended at end of file; slot offsets are advisory.
    #[default]
    Append,
    /// Record `i` of a call is written at `base + record_stride * i`, where
    /// `base` is the file length when the sink was acquired.
    Stride,
}

/// Configuration for a hex copy service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Path of the persistent sink file.
    pub sink_path: PathBuf,

    /// Payload bytes per hex record.
    pub bytes_per_record: usize,

    /// Byte offset between consecutive record slots.
    pub record_stride: u64,

    /// Largest count a single write may request.
    pub max_write_len: usize,

    /// Record placement inside the sink.
    pub placement: Placement,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sink_path: PathBuf::from(DEFAULT_SINK_PATH),
            bytes_per_record: DEFAULT_BYTES_PER_RECORD,
            record_stride: DEFAULT_RECORD_STRIDE,
            max_write_len: DEFAULT_MAX_WRITE_LEN,
            placement: Placement::Append,
        }
    }
}

impl ServiceConfig {
    /// Create a configuration with the default layout writing to `sink_path`.
    pub fn new(sink_path: impl Into<PathBuf>) -> Self {
        Self {
            sink_path: sink_path.into(),
            ..Self::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.bytes_per_record == 0 {
            return Err(Error::InvalidConfig(
                "bytes_per_record must be greater than 0".to_string(),
            ));
        }
        let full_record = (self.bytes_per_record as u64)
            .checked_mul(CHARS_PER_BYTE)
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "bytes_per_record {} is too large",
                    self.bytes_per_record
                ))
            })?;
        if self.record_stride < full_record {
            return Err(Error::InvalidConfig(format!(
                "record_stride {} cannot hold a full record of {} bytes",
                self.record_stride, full_record
            )));
        }
        if self.max_write_len == 0 {
            return Err(Error::InvalidConfig(
                "max_write_len must be greater than 0".to_string(),
            ));
        }
        // Every slot of the largest write must end inside a u64 file offset.
        let slots = (self.max_write_len / self.bytes_per_record) as u64 + 1;
        if self.record_stride.checked_mul(slots).is_none() {
            return Err(Error::InvalidConfig(format!(
                "record_stride {} overflows the sink offset for {} records",
                self.record_stride, slots
            )));
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Fields missing from the file take their default values.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}
