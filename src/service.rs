//! Service facade - the open/read/write/release entry points.

use crate::boundary::{ingest, CopySource};
use crate::config::ServiceConfig;
use crate::encoding::encode;
use crate::error::{Error, Result};
use crate::session::{SessionManager, StatusMessage};
use crate::storage::{ByteSink, FileSink};
use tracing::{debug, warn};

/// The hex copy service.
///
/// One long-lived instance owns the session slot and the sink. All entry
/// points take `&self`, so an instance can be shared between threads; the
/// session slot still admits only one opener at a time.
pub struct HexCopyService {
    config: ServiceConfig,
    session: SessionManager,
    sink: Box<dyn ByteSink>,
}

impl HexCopyService {
    /// Create a service over an arbitrary sink.
    ///
    /// The sink must place records the way `config.placement` says.
    pub fn new(config: ServiceConfig, sink: Box<dyn ByteSink>) -> Result<Self> {
        config.validate()?;
        if sink.placement() != config.placement {
            return Err(Error::InvalidConfig(format!(
                "{} sink uses {:?} placement, configuration asks for {:?}",
                sink.name(),
                sink.placement(),
                config.placement
            )));
        }
        Ok(Self {
            config,
            session: SessionManager::new(),
            sink,
        })
    }

    /// Create a service writing to the file named by `config.sink_path`.
    pub fn with_file_sink(config: ServiceConfig) -> Result<Self> {
        let sink = FileSink::new(config.sink_path.clone(), config.placement);
        Self::new(config, Box::new(sink))
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn open_count(&self) -> u64 {
        self.session.open_count()
    }

    /// Open a session. Fails with [`Error::Busy`] while one is active.
    pub fn open(&self) -> Result<StatusMessage> {
        self.session.open()
    }

    /// Read up to `max_len` bytes of the session status message.
    ///
    /// Never fails; an empty result signals end-of-data.
    pub fn read(&self, max_len: usize) -> Vec<u8> {
        self.session.read(max_len)
    }

    /// Dump the first `count` bytes of `buf` to the sink.
    pub fn write(&self, buf: &[u8], count: usize) -> Result<usize> {
        self.write_from(buf, count)
    }

    /// Dump `count` bytes pulled from `source` to the sink.
    ///
    /// The payload is copied into an owned buffer, rendered into hex records
    /// and every record is written into slot `record_stride * index` of a
    /// single sink acquisition. Returns `count` on success.
    ///
    /// An incomplete copy and a short record write are logged and the call
    /// carries on. A sink that cannot be acquired fails the call; records
    /// already written by a failing call stay in the sink.
    pub fn write_from<S: CopySource + ?Sized>(&self, source: &S, count: usize) -> Result<usize> {
        let buffer = ingest(source, count, self.config.max_write_len)?;
        if let Err(e) = buffer.require_complete() {
            warn!(error = %e, "continuing with partially copied payload");
        }

        let mut handle = self.sink.acquire()?;
        let mut records = 0usize;
        for record in encode(buffer.as_slice(), self.config.bytes_per_record) {
            let offset = self
                .config
                .record_stride
                .checked_mul(record.index() as u64)
                .ok_or_else(|| {
                    Error::InvalidConfig(format!(
                        "slot offset of record {} overflows",
                        record.index()
                    ))
                })?;
            let expected = record.as_bytes().len();
            let written = handle.write_record(offset, record.as_bytes())?;
            if written < expected {
                let e = Error::SinkWriteShortfall { expected, written };
                warn!(record = record.index(), error = %e, "short write to sink");
            }
            records += 1;
        }

        debug!(count, records, sink = self.sink.name(), "write complete");
        Ok(count)
    }

    /// Release the session. Never fails.
    pub fn release(&self) {
        self.session.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Placement;
    use crate::storage::MemorySink;

    fn memory_service() -> (HexCopyService, MemorySink) {
        let sink = MemorySink::new(Placement::Append);
        let service =
            HexCopyService::new(ServiceConfig::default(), Box::new(sink.clone())).unwrap();
        (service, sink)
    }

    #[test]
    fn test_write_ten_bytes() {
        let (service, sink) = memory_service();
        let payload: Vec<u8> = (0..10).collect();

        service.open().unwrap();
        assert_eq!(service.write(&payload, 10).unwrap(), 10);
        service.release();

        assert_eq!(sink.contents_lossy(), "00 01 02 03 04 05 06 07\n08 09 ");
    }

    #[test]
    fn test_write_zero_length() {
        let (service, sink) = memory_service();
        assert_eq!(service.write(b"", 0).unwrap(), 0);
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn test_write_count_shorter_than_buffer() {
        let (service, sink) = memory_service();
        service.write(b"\x01\x02\x03\x04", 2).unwrap();
        assert_eq!(sink.contents_lossy(), "01 02 ");
    }

    #[test]
    fn test_write_count_longer_than_buffer_proceeds() {
        let (service, sink) = memory_service();
        assert_eq!(service.write(b"\xff", 3).unwrap(), 3);
        assert_eq!(sink.contents_lossy(), "ff 00 00 ");
    }

    #[test]
    fn test_write_rejects_oversized_count() {
        let (service, sink) = memory_service();
        let payload = vec![0u8; 1001];
        assert!(matches!(
            service.write(&payload, 1001),
            Err(Error::CapacityExceeded { .. })
        ));
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn test_sink_unavailable_keeps_session() {
        let (service, sink) = memory_service();
        service.open().unwrap();
        sink.set_available(false);

        assert!(matches!(
            service.write(b"abc", 3),
            Err(Error::SinkUnavailable { .. })
        ));
        assert!(service.is_active());

        service.release();
        assert!(!service.is_active());
    }

    #[test]
    fn test_short_sink_write_is_not_fatal() {
        let sink = MemorySink::new(Placement::Append).with_write_limit(3);
        let service =
            HexCopyService::new(ServiceConfig::default(), Box::new(sink.clone())).unwrap();

        let payload = [0x10u8; 9];
        assert_eq!(service.write(&payload, 9).unwrap(), 9);
        assert_eq!(sink.contents_lossy(), "10 10 ");
    }

    #[test]
    fn test_stride_placement() {
        let sink = MemorySink::new(Placement::Stride);
        let config = ServiceConfig {
            placement: Placement::Stride,
            ..ServiceConfig::default()
        };
        let service = HexCopyService::new(config, Box::new(sink.clone())).unwrap();

        service.write(&[0xaa; 9], 9).unwrap();

        let contents = sink.contents();
        assert_eq!(contents.len(), 27);
        assert_eq!(&contents[..24], b"aa aa aa aa aa aa aa aa\n");
        assert_eq!(&contents[24..], b"aa ");
    }

    #[test]
    fn test_overflowing_stride_rejected_before_write() {
        let config = ServiceConfig {
            record_stride: u64::MAX,
            ..ServiceConfig::default()
        };
        let result = HexCopyService::new(config, Box::new(MemorySink::default()));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_placement_mismatch_rejected() {
        let config = ServiceConfig {
            placement: Placement::Stride,
            ..ServiceConfig::default()
        };
        let sink = MemorySink::new(Placement::Append);
        let result = HexCopyService::new(config, Box::new(sink));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ServiceConfig {
            bytes_per_record: 0,
            ..ServiceConfig::default()
        };
        let result = HexCopyService::new(config, Box::new(MemorySink::default()));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_read_status_through_service() {
        let (service, _sink) = memory_service();
        let status = service.open().unwrap();
        let mut read = Vec::new();
        loop {
            let chunk = service.read(2);
            if chunk.is_empty() {
                break;
            }
            read.extend(chunk);
        }
        assert_eq!(read, status.as_bytes());
        assert!(service.read(2).is_empty());
    }
}
