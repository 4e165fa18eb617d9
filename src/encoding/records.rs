//! Record-by-record hex rendering.
//!
//! The record layout keeps two compatibility quirks of the device output:
//!
//! - A payload whose length is a multiple of the record width (including an
//!   empty payload) ends with one extra, empty record.
//! - Every byte except the last slot of a record is followed by a space. A
//!   short final record therefore ends with a space and carries no newline.

/// One rendered line of the hex dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexRecord {
    index: usize,
    covered: usize,
    text: String,
}

impl HexRecord {
    /// Position of this record within its payload, starting at 0.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of payload bytes rendered in this record.
    pub fn covered(&self) -> usize {
        self.covered
    }

    /// Rendered text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Rendered text as bytes, ready for the sink.
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Whether the record renders no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the record is a full line terminated by `\n`.
    pub fn ends_line(&self) -> bool {
        self.text.ends_with('\n')
    }
}

/// Lazy, restartable sequence of records over a borrowed payload.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    buffer: &'a [u8],
    per_record: usize,
    next: usize,
    total: usize,
}

impl<'a> Iterator for Records<'a> {
    type Item = HexRecord;

    fn next(&mut self) -> Option<HexRecord> {
        if self.next >= self.total {
            return None;
        }
        let index = self.next;
        self.next += 1;

        let start = (index * self.per_record).min(self.buffer.len());
        let end = (start + self.per_record).min(self.buffer.len());
        let chunk = &self.buffer[start..end];

        let digits = ::hex::encode(chunk);
        let mut text = String::with_capacity(chunk.len() * 3);
        for (k, pair) in digits.as_bytes().chunks(2).enumerate() {
            text.push(char::from(pair[0]));
            text.push(char::from(pair[1]));
            // Only the final slot of a record closes the line.
            text.push(if k + 1 == self.per_record { '\n' } else { ' ' });
        }

        Some(HexRecord {
            index,
            covered: chunk.len(),
            text,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Records<'_> {}

/// Number of records produced for a payload of `len` bytes.
///
/// Always `len / per_record + 1`: `ceil(len / per_record)` for ragged
/// payloads, plus one empty trailing record for aligned ones.
///
/// # Panics
///
/// Panics if `per_record` is zero.
pub fn record_count(len: usize, per_record: usize) -> usize {
    assert!(per_record > 0, "record width must be non-zero");
    len / per_record + 1
}

/// Render one byte as two lowercase hex digits.
pub fn render_byte(byte: u8) -> String {
    ::hex::encode([byte])
}

/// Split `buffer` into hex records of `per_record` bytes each.
///
/// Record `i` covers `buffer[per_record * i..per_record * (i + 1)]`.
///
/// # Panics
///
/// Panics if `per_record` is zero.
///
/// # Example
///
/// ```
/// use hexcopy::encoding::encode;
///
/// let records: Vec<_> = encode(&[0xde, 0xad, 0xbe, 0xef], 8).collect();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].as_str(), "de ad be ef ");
/// ```
pub fn encode(buffer: &[u8], per_record: usize) -> Records<'_> {
    Records {
        buffer,
        per_record,
        next: 0,
        total: record_count(buffer.len(), per_record),
    }
}

/// Render the whole dump of `buffer` as it would appear in a fresh sink.
pub fn encode_to_string(buffer: &[u8], per_record: usize) -> String {
    encode(buffer, per_record)
        .map(|record| record.text)
        .collect()
}
