//! Wire Frames
//!
//! A frame is the JSON envelope for a stream's readable bits: big-endian
//! hex plus the exact bit count, so the padding in the final byte is never
//! mistaken for data.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::bit_stream::{words_from_bytes, BitStream};
use crate::config::{ReadMode, StreamConfig};
use crate::error::{BitStreamError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Frame {
    pub bits: usize,
    pub hex: String,
}

impl Frame {
    pub fn from_stream(stream: &BitStream) -> Self {
        Self {
            bits: stream.size(),
            hex: hex::encode(stream.to_bytes()),
        }
    }

    /// Rebuild the stream described by this frame.
    ///
    /// A bit count larger than the payload is clamped in lenient mode and
    /// rejected in strict mode.
    pub fn into_stream(self, config: &StreamConfig) -> Result<BitStream> {
        let bytes = hex::decode(&self.hex)?;
        let available = bytes.len() * 8;
        if self.bits > available {
            if config.mode == ReadMode::Strict {
                return Err(BitStreamError::Underflow { requested: self.bits, available });
            }
            debug!("frame declares {} bit(s) but carries {}", self.bits, available);
        }

        let mut stream = BitStream::with_config(config);
        stream.write_bits(&words_from_bytes(&bytes), self.bits.min(available))?;
        Ok(stream)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
