//! Typed Fields
//!
//! Application-level values and the ordered encode/decode passes that drive
//! the codecs. The wire carries no schema: a field list must be decoded with
//! the same kinds, in the same order, that produced it.

use serde::{Deserialize, Serialize};
use std::fs;

use crate::bit_stream::BitStream;
use crate::compact_int::Number;
use crate::config::{ReadMode, StreamConfig};
use crate::error::{BitStreamError, Result};
use crate::text::text_encoded_bits;

/// A single value to place on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Flag(bool),
    U4(u8),
    U8(u8),
    U16(u16),
    U32(u32),
    /// Value in `[0, 1]`, 8-bit quantized.
    Float(f32),
    /// Compact integer.
    Int(Number),
    Text(String),
}

/// The decoder-side description of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Flag,
    U4,
    U8,
    U16,
    U32,
    Float,
    Int,
    Text,
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Flag(_) => FieldKind::Flag,
            FieldValue::U4(_) => FieldKind::U4,
            FieldValue::U8(_) => FieldKind::U8,
            FieldValue::U16(_) => FieldKind::U16,
            FieldValue::U32(_) => FieldKind::U32,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Text(_) => FieldKind::Text,
        }
    }

    /// Convert field value to string representation
    pub fn as_string(&self) -> String {
        match self {
            FieldValue::Flag(v) => v.to_string(),
            FieldValue::U4(v) => format!("0x{:x}", v),
            FieldValue::U8(v) => format!("0x{:02x}", v),
            FieldValue::U16(v) => format!("0x{:04x}", v),
            FieldValue::U32(v) => format!("0x{:08x}", v),
            FieldValue::Float(v) => format!("{:.4}", v),
            FieldValue::Int(v) => v.to_string(),
            FieldValue::Text(v) => format!("{:?}", v),
        }
    }

    /// Encoded size of this field in bits
    pub fn size_bits(&self) -> usize {
        match self {
            FieldValue::Flag(_) => 1,
            FieldValue::U4(_) => 4,
            FieldValue::U8(_) | FieldValue::Float(_) => 8,
            FieldValue::U16(_) => 16,
            FieldValue::U32(_) => 32,
            FieldValue::Int(v) => v.encoded_bits(),
            FieldValue::Text(v) => text_encoded_bits(v),
        }
    }

    /// Append this field to `stream`.
    ///
    /// In strict mode a `u4` above 15 is rejected instead of masked.
    pub fn write_to(&self, stream: &mut BitStream) -> Result<()> {
        match self {
            FieldValue::Flag(v) => {
                stream.write_flag(*v);
            }
            FieldValue::U4(v) => {
                if *v > 0x0F && stream.mode() == ReadMode::Strict {
                    return Err(BitStreamError::Schema(format!("u4 value {} exceeds 4 bits", v)));
                }
                stream.write_u4(*v);
            }
            FieldValue::U8(v) => stream.write_u8(*v),
            FieldValue::U16(v) => stream.write_u16(*v),
            FieldValue::U32(v) => stream.write_u32(*v),
            FieldValue::Float(v) => stream.write_float(*v),
            FieldValue::Int(v) => {
                stream.write_int(*v)?;
            }
            FieldValue::Text(v) => {
                stream.write_string(v, false)?;
            }
        }
        Ok(())
    }
}

impl FieldKind {
    /// Read one field of this kind from the head of `stream`.
    pub fn read_from(self, stream: &mut BitStream) -> Result<FieldValue> {
        Ok(match self {
            FieldKind::Flag => FieldValue::Flag(stream.read_flag()?),
            FieldKind::U4 => FieldValue::U4(stream.read_u4()?),
            FieldKind::U8 => FieldValue::U8(stream.read_u8()?),
            FieldKind::U16 => FieldValue::U16(stream.read_u16()?),
            FieldKind::U32 => FieldValue::U32(stream.read_u32()?),
            FieldKind::Float => FieldValue::Float(stream.read_float()?),
            FieldKind::Int => FieldValue::Int(stream.read_int()?),
            FieldKind::Text => FieldValue::Text(stream.read_string()?),
        })
    }
}

/// Encode fields in order into a fresh stream built from `config`.
pub fn encode_fields(fields: &[FieldValue], config: &StreamConfig) -> Result<BitStream> {
    let mut stream = BitStream::with_config(config);
    for field in fields {
        field.write_to(&mut stream)?;
    }
    Ok(stream)
}

/// Decode one field per kind, in order.
///
/// In strict mode every bit must be consumed; leftover bits mean the schema
/// does not match the data.
pub fn decode_fields(stream: &mut BitStream, kinds: &[FieldKind]) -> Result<Vec<FieldValue>> {
    let values = kinds
        .iter()
        .map(|kind| kind.read_from(stream))
        .collect::<Result<Vec<_>>>()?;

    if stream.mode() == ReadMode::Strict && !stream.is_empty() {
        return Err(BitStreamError::Schema(format!(
            "{} bit(s) left after the last field",
            stream.size()
        )));
    }
    Ok(values)
}

/// Load a list of field values from a JSON file.
pub fn fields_from_file(path: &str) -> Result<Vec<FieldValue>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load a list of field kinds from a JSON file.
pub fn schema_from_file(path: &str) -> Result<Vec<FieldKind>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
