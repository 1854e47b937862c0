//! Outbound log sink.
//!
//! Flushed text leaves the pipeline through a [`LogSink`]. Sinks may impose
//! a per-message size limit, so emission goes through [`emit_chunked`]:
//! messages longer than [`MAX_CHUNK_CHARS`] characters are split into
//! sequential pieces whose concatenation reproduces the original exactly.

use std::sync::Arc;

/// Maximum characters per emitted piece.
pub const MAX_CHUNK_CHARS: usize = 2000;

/// Destination for flushed log text.
///
/// The default is [`TracingSink`]; tests and hosts with their own logging
/// infrastructure substitute an implementation.
pub trait LogSink: Send + Sync + 'static {
    /// Emit one piece of log text under the given tag.
    fn emit(&self, tag: &str, message: &str);
}

/// Sink that forwards to the `tracing` error level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, tag: &str, message: &str) {
        tracing::error!(tag = %tag, "{message}");
    }
}

/// Shared sinks are sinks: lets a host hand the watcher an `Arc` to a sink
/// it keeps reading from (test captures do exactly this).
impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn emit(&self, tag: &str, message: &str) {
        (**self).emit(tag, message);
    }
}

/// Emit a message through the sink, splitting it into ordered pieces of at
/// most [`MAX_CHUNK_CHARS`] characters each.
pub fn emit_chunked(sink: &Arc<dyn LogSink>, tag: &str, message: &str) {
    for chunk in chunk_message(message) {
        sink.emit(tag, chunk);
    }
}

/// Split a message into ordered pieces of at most [`MAX_CHUNK_CHARS`]
/// characters. Splits on character boundaries, never inside a code point.
pub(crate) fn chunk_message(message: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = message;
    loop {
        let split = match rest.char_indices().nth(MAX_CHUNK_CHARS) {
            Some((idx, _)) => idx,
            None => {
                chunks.push(rest);
                return chunks;
            }
        };
        let (head, tail) = rest.split_at(split);
        chunks.push(head);
        rest = tail;
    }
}
