//! # densebits - bit-addressable serialization
//!
//! Packs flags, fixed-width integers, quantized floats, compact integers
//! and adaptively encoded text into a dense stream of 16-bit cells.

pub mod bit_stream;
pub mod config;
pub mod error;

// Codecs built on the bit stream engine
pub mod compact_int;
pub mod primitive;
pub mod text;

// Diagnostics
pub mod observer;
pub mod stream_display;

// Application layer
pub mod field;
pub mod wire;

// Core error/result types
pub use error::{BitStreamError, Result};

pub use bit_stream::{BitStream, CELL_BITS};
pub use config::{ReadMode, StreamConfig};

// Re-export codec types for ease of use
pub use compact_int::{IntWidth, Number};
pub use text::{classify, text_encoded_bits, Alphabet, MAX_TEXT_UNITS};

pub use observer::{LogObserver, StreamObserver};
pub use stream_display::{display_stream, render_stream};

pub use field::{decode_fields, encode_fields, FieldKind, FieldValue};
pub use wire::Frame;
