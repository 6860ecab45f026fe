//! Bit Stream Engine
//!
//! Packs bits MSB-first into 16-bit cells. Writes append at the tail,
//! reads consume from the head and hand back an independent stream
//! holding the extracted bits, left-justified.

use std::collections::VecDeque;
use std::fmt;

use log::debug;

use crate::config::{ReadMode, StreamConfig};
use crate::error::{BitStreamError, Result};
use crate::observer::{LogObserver, StreamObserver};

/// Width of one storage cell in bits.
pub const CELL_BITS: usize = 16;

/// Mask selecting the `n` most significant bits of a cell.
#[inline]
pub(crate) fn high_mask(n: usize) -> u16 {
    if n == 0 {
        0
    } else {
        !0u16 << (CELL_BITS - n)
    }
}

/// Pack big-endian bytes into words, zero-padding an odd trailing byte.
pub(crate) fn words_from_bytes(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
        .collect()
}

/// A bit-addressable FIFO of 16-bit cells.
///
/// `head_offset` counts the bits already consumed from the first cell and
/// `tail_fill` the bits used in the last one. A `tail_fill` of zero means
/// either that there are no cells or that the last cell is full; both cases
/// start a fresh cell on the next write.
pub struct BitStream {
    cells: VecDeque<u16>,
    head_offset: usize,
    tail_fill: usize,
    mode: ReadMode,
    observer: Option<Box<dyn StreamObserver>>,
}

impl BitStream {
    /// Create a new empty lenient stream.
    pub fn new() -> Self {
        Self::with_mode(ReadMode::Lenient)
    }

    /// Create a new empty stream that reports truncation as an error.
    pub fn strict() -> Self {
        Self::with_mode(ReadMode::Strict)
    }

    pub fn with_mode(mode: ReadMode) -> Self {
        Self {
            cells: VecDeque::new(),
            head_offset: 0,
            tail_fill: 0,
            mode,
            observer: None,
        }
    }

    /// Create a stream from a loaded configuration, attaching a
    /// `LogObserver` when tracing is requested.
    pub fn with_config(config: &StreamConfig) -> Self {
        let mut stream = Self::with_mode(config.mode);
        if config.trace {
            stream.set_observer(Box::new(LogObserver));
        }
        stream
    }

    /// Rebuild a stream from left-justified words, keeping the first `bits` bits.
    pub fn from_words(words: &[u16], bits: usize) -> Self {
        let mut stream = Self::new();
        stream.append(words, bits.min(words.len() * CELL_BITS));
        stream
    }

    /// Rebuild a stream from big-endian bytes, keeping the first `bits` bits.
    pub fn from_bytes(bytes: &[u8], bits: usize) -> Self {
        Self::from_words(&words_from_bytes(bytes), bits.min(bytes.len() * 8))
    }

    pub fn mode(&self) -> ReadMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ReadMode) {
        self.mode = mode;
    }

    /// Attach a diagnostics hook. Observers never influence encoded bits.
    pub fn set_observer(&mut self, observer: Box<dyn StreamObserver>) {
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Number of readable bits.
    pub fn size(&self) -> usize {
        self.cells.len() * CELL_BITS - self.head_offset - (CELL_BITS - self.tail_fill) % CELL_BITS
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn head_offset(&self) -> usize {
        self.head_offset
    }

    pub fn tail_fill(&self) -> usize {
        self.tail_fill
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Raw cells, including consumed head bits and tail padding.
    pub fn cells(&self) -> impl ExactSizeIterator<Item = u16> + '_ {
        self.cells.iter().copied()
    }

    /// Append the `count` most significant bits of `source`.
    ///
    /// Asking for more bits than `source` holds is clamped in lenient mode
    /// and rejected in strict mode.
    pub fn write_bits(&mut self, source: &[u16], count: usize) -> Result<()> {
        let available = source.len() * CELL_BITS;
        if count > available {
            if self.mode == ReadMode::Strict {
                return Err(BitStreamError::Overflow { requested: count, available });
            }
            debug!("write_bits: clamping {} requested bit(s) to the {} supplied", count, available);
        }
        self.append(source, count.min(available));
        Ok(())
    }

    /// Consume `count` bits from the head and return them as a new stream.
    ///
    /// Asking for more than `size()` bits is clamped in lenient mode (the
    /// returned stream is simply shorter) and rejected in strict mode.
    pub fn read_bits(&mut self, count: usize) -> Result<BitStream> {
        let available = self.size();
        if count > available {
            if self.mode == ReadMode::Strict {
                return Err(BitStreamError::Underflow { requested: count, available });
            }
            debug!("read_bits: clamping {} requested bit(s) to the {} remaining", count, available);
        }
        Ok(self.extract(count.min(available)))
    }

    /// Word `index` of the stream's readable bits, or zero past the end.
    ///
    /// Only meaningful on streams returned by `read_bits`, whose head offset
    /// is always zero.
    pub(crate) fn word(&self, index: usize) -> u16 {
        self.cells.get(index).copied().unwrap_or(0)
    }

    /// Up to 32 bits starting `skip` bits past the head, right-aligned,
    /// without consuming them. Bits past the end read as zero.
    pub(crate) fn peek(&self, skip: usize, count: usize) -> u32 {
        let start = self.head_offset + skip;
        (start..start + count).fold(0, |acc, pos| {
            let cell = self.cells.get(pos / CELL_BITS).copied().unwrap_or(0);
            (acc << 1) | ((cell >> (CELL_BITS - 1 - pos % CELL_BITS)) & 1) as u32
        })
    }

    /// Infallible append; `count` must not exceed `source.len() * CELL_BITS`.
    pub(crate) fn append(&mut self, source: &[u16], count: usize) {
        let mut pointer = 0;
        while pointer < count {
            let in_word = pointer % CELL_BITS;
            let bits = (count - pointer).min(CELL_BITS - in_word);
            let word = source.get(pointer / CELL_BITS).copied().unwrap_or(0) << in_word;
            let value = (word >> (CELL_BITS - bits)) as u32;

            if self.tail_fill == 0 {
                self.cells.push_back(0);
            }

            let first = bits.min(CELL_BITS - self.tail_fill);
            let spill = bits - first;
            let last = self.cells.len() - 1;

            // Keep the filled high bits, place the new ones right after them
            let kept = self.cells[last] & high_mask(self.tail_fill);
            let placed = ((value >> spill) << (CELL_BITS - self.tail_fill - first)) as u16;
            self.cells[last] = kept | placed;

            if spill > 0 {
                let rest = value & ((1u32 << spill) - 1);
                self.cells.push_back((rest << (CELL_BITS - spill)) as u16);
            }

            self.tail_fill = (self.tail_fill + bits) % CELL_BITS;
            pointer += bits;
        }

        if count > 0 {
            if let Some(observer) = &self.observer {
                observer.on_write(count, self);
            }
        }
    }

    /// Infallible head consumption; `count` must not exceed `size()`.
    fn extract(&mut self, count: usize) -> BitStream {
        let mut out = BitStream::with_mode(self.mode);
        let mut remaining = count;

        if self.head_offset > 0 && remaining > 0 {
            let n = remaining.min(CELL_BITS - self.head_offset);
            let head = self.cells.front().copied().unwrap_or(0);
            out.append(&[(head << self.head_offset) & high_mask(n)], n);

            self.head_offset = (self.head_offset + n) % CELL_BITS;
            if self.head_offset == 0 {
                self.cells.pop_front();
            }
            remaining -= n;
        }

        while remaining > 0 {
            let n = remaining.min(CELL_BITS);
            let head = self.cells.front().copied().unwrap_or(0);
            out.append(&[head & high_mask(n)], n);

            if n < CELL_BITS {
                self.head_offset = n;
            } else {
                self.cells.pop_front();
            }
            remaining -= n;
        }

        if self.size() == 0 {
            self.reset();
        }

        if count > 0 {
            if let Some(observer) = &self.observer {
                observer.on_read(count, self);
            }
        }

        out
    }

    fn reset(&mut self) {
        self.cells.clear();
        self.head_offset = 0;
        self.tail_fill = 0;
    }

    /// Readable bits re-aligned to the first word, padding zeroed.
    pub fn to_words(&self) -> Vec<u16> {
        let size = self.size();
        let shift = self.head_offset;
        let word_count = size.div_ceil(CELL_BITS);
        let mut words = Vec::with_capacity(word_count);

        for i in 0..word_count {
            let high = self.cells.get(i).copied().unwrap_or(0) << shift;
            let low = if shift > 0 {
                self.cells.get(i + 1).map_or(0, |cell| cell >> (CELL_BITS - shift))
            } else {
                0
            };
            let bits = (size - i * CELL_BITS).min(CELL_BITS);
            words.push((high | low) & high_mask(bits));
        }

        words
    }

    /// Readable bits as big-endian bytes, trailing partial byte zero-padded.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = self.to_words().iter().flat_map(|w| w.to_be_bytes()).collect();
        bytes.truncate(self.size().div_ceil(8));
        bytes
    }
}

impl Default for BitStream {
    fn default() -> Self {
        Self::new()
    }
}

/// Two streams are equal when they hold the same readable bits,
/// whatever their head offsets.
impl PartialEq for BitStream {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.to_words() == other.to_words()
    }
}

impl fmt::Debug for BitStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self.cells.iter().map(|c| format!("{:04x}", c)).collect();
        f.debug_struct("BitStream")
            .field("size", &self.size())
            .field("head_offset", &self.head_offset)
            .field("tail_fill", &self.tail_fill)
            .field("cells", &cells)
            .field("mode", &self.mode)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}
