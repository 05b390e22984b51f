//! Incremental decoder for the live event stream.

use crate::error::{SyncError, SyncResult};
use crate::protocol::{StreamEnvelope, WatchEvent, DATA_PREFIX};
use tracing::{debug, trace, warn};

/// Longest line the decoder will hold, terminator excluded.
pub const MAX_LINE_BYTES: usize = 8 * 1024 * 1024;

/// Splits a chunked byte stream into lines and decodes the `data:` frames.
///
/// Chunk boundaries are arbitrary: a frame, or a single UTF-8 sequence, may
/// be split across reads. The trailing incomplete line is kept until the
/// next [`push`](Self::push) completes it. A line that grows past the
/// decoder's limit is discarded up to its terminator.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    max_line: usize,
    /// Inside an oversized line; bytes are dropped until the next `\n`.
    skipping: bool,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_line,
            skipping: false,
        }
    }

    /// Appends `chunk` and returns the events from every line it completed,
    /// in stream order. Undecodable and oversized lines are dropped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<WatchEvent> {
        let mut chunk = chunk;
        if self.skipping {
            match chunk.iter().position(|b| *b == b'\n') {
                Some(offset) => {
                    self.skipping = false;
                    chunk = &chunk[offset + 1..];
                }
                None => return Vec::new(),
            }
        }
        self.buf.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buf[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            if offset > self.max_line {
                warn!(bytes = offset, limit = self.max_line, "discarding oversized line");
            } else if let Some(event) = decode_line(&self.buf[start..end]) {
                events.push(event);
            }
            start = end + 1;
        }
        self.buf.drain(..start);

        if self.buf.len() > self.max_line {
            warn!(bytes = self.buf.len(), limit = self.max_line, "discarding oversized line");
            self.buf.clear();
            self.skipping = true;
        }
        events
    }

    /// Bytes held back waiting for a line terminator.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Drops any partial line.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.skipping = false;
    }
}

/// Decodes one line without its `\n`. A trailing `\r` is ignored.
pub fn decode_line(line: &[u8]) -> Option<WatchEvent> {
    let text = match std::str::from_utf8(line) {
        Ok(text) => text.trim(),
        Err(e) => {
            debug!(error = %e, "discarding non-UTF-8 line");
            return None;
        }
    };
    let Some(payload) = text.strip_prefix(DATA_PREFIX) else {
        if !text.is_empty() {
            trace!(line = text, "ignoring non-data line");
        }
        return None;
    };
    match parse_payload(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!(error = %e, "discarding frame");
            None
        }
    }
}

/// Parses the JSON that follows the `data:` prefix.
pub fn parse_payload(payload: &str) -> SyncResult<WatchEvent> {
    let envelope: StreamEnvelope = serde_json::from_str(payload.trim())?;
    if !envelope.result.application.has_identity() {
        return Err(SyncError::Decode("application has no name".to_string()));
    }
    Ok(envelope.result)
}
