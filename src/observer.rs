//! Diagnostics hooks
//!
//! Observers are notified after bits are appended to or consumed from a
//! stream. They only look; encoding and decoding never depend on them.

use log::{log_enabled, trace, Level};

use crate::bit_stream::BitStream;
use crate::stream_display::render_stream;

/// Observers travel with their stream, so they must be `Send` for the
/// stream to be handed to another thread.
pub trait StreamObserver: Send {
    /// Called after `bits` bits were appended to `stream`.
    fn on_write(&self, _bits: usize, _stream: &BitStream) {}

    /// Called after `bits` bits were consumed from `stream`.
    fn on_read(&self, _bits: usize, _stream: &BitStream) {}
}

/// Dumps the stream through the `log` facade at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl StreamObserver for LogObserver {
    fn on_write(&self, bits: usize, stream: &BitStream) {
        if log_enabled!(Level::Trace) {
            trace!("wrote {} bit(s)\n{}", bits, render_stream(stream));
        }
    }

    fn on_read(&self, bits: usize, stream: &BitStream) {
        if log_enabled!(Level::Trace) {
            trace!("read {} bit(s)\n{}", bits, render_stream(stream));
        }
    }
}
