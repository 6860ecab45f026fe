//! Compact Integer Codec
//!
//! Up to three flags pick the narrowest of u8, u16 and u32. Anything that
//! fits none of them (negative, non-integral or wider than 32 bits) is
//! written as its decimal text through the adaptive text codec.

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::bit_stream::BitStream;
use crate::config::ReadMode;
use crate::error::{BitStreamError, Result};
use crate::text::text_encoded_bits;

/// A value for the compact integer codec.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i128),
    Real(f64),
}

/// Representation chosen for a `Number` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    U8,
    U16,
    U32,
    Text,
}

impl IntWidth {
    /// Number of selector flags written before the payload.
    pub fn flag_bits(self) -> usize {
        match self {
            IntWidth::U8 => 1,
            IntWidth::U16 => 2,
            IntWidth::U32 | IntWidth::Text => 3,
        }
    }
}

impl Number {
    /// The value as an integer, if it is one.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Number::Int(v) => Some(v),
            Number::Real(v) => {
                if v.is_finite() && v.fract() == 0.0 && v >= i128::MIN as f64 && v < i128::MAX as f64 {
                    Some(v as i128)
                } else {
                    None
                }
            }
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        self.as_i128().and_then(|v| u32::try_from(v).ok())
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_i128().and_then(|v| u64::try_from(v).ok())
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(v) => v as f64,
            Number::Real(v) => v,
        }
    }

    pub fn width(&self) -> IntWidth {
        match self.as_u32() {
            Some(v) if v <= u8::MAX as u32 => IntWidth::U8,
            Some(v) if v <= u16::MAX as u32 => IntWidth::U16,
            Some(_) => IntWidth::U32,
            None => IntWidth::Text,
        }
    }

    /// Decimal form used by the text fallback.
    pub fn to_text(&self) -> String {
        let real = self.as_f64();
        match self.as_i128() {
            Some(v) => v.to_string(),
            // Integral reals past i128 keep an exponent so they parse back as reals
            None if real.is_finite() && real.fract() == 0.0 => format!("{:e}", real),
            None => real.to_string(),
        }
    }

    /// Bits `write_int` spends on this value.
    pub fn encoded_bits(&self) -> usize {
        let width = self.width();
        width.flag_bits()
            + match width {
                IntWidth::U8 => 8,
                IntWidth::U16 => 16,
                IntWidth::U32 => 32,
                IntWidth::Text => text_encoded_bits(&self.to_text()),
            }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Real(a), Number::Real(b)) => a == b,
            (Number::Int(a), Number::Real(_)) | (Number::Real(_), Number::Int(a)) => {
                self.as_i128() == Some(*a) && other.as_i128() == Some(*a)
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::Real(v) => write!(f, "{}", v),
        }
    }
}

impl FromStr for Number {
    type Err = BitStreamError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(v) = s.parse::<i128>() {
            return Ok(Number::Int(v));
        }
        s.parse::<f64>()
            .map(Number::Real)
            .map_err(|_| BitStreamError::InvalidNumber(s.to_string()))
    }
}

macro_rules! number_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Number {
            fn from(v: $t) -> Self {
                Number::Int(v as i128)
            }
        })*
    };
}

number_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, i128);

impl From<f32> for Number {
    fn from(v: f32) -> Self {
        Number::Real(v as f64)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Real(v)
    }
}

// JSON numbers cannot carry every i128, so out-of-range integers travel as strings
impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            Number::Int(v) => match i64::try_from(v) {
                Ok(small) => serializer.serialize_i64(small),
                Err(_) => match u64::try_from(v) {
                    Ok(big) => serializer.serialize_u64(big),
                    Err(_) => serializer.collect_str(&v),
                },
            },
            Number::Real(v) => serializer.serialize_f64(v),
        }
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NumberVisitor)
    }
}

struct NumberVisitor;

impl<'de> Visitor<'de> for NumberVisitor {
    type Value = Number;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Number, E> {
        Ok(Number::Int(v as i128))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Number, E> {
        Ok(Number::Int(v as i128))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Number, E> {
        Ok(Number::Real(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Number, E> {
        v.parse().map_err(E::custom)
    }
}

impl BitStream {
    /// Write a number in the narrowest representation and return the one chosen.
    pub fn write_int(&mut self, value: impl Into<Number>) -> Result<IntWidth> {
        let value = value.into();
        let width = value.width();
        let small = value.as_u32().unwrap_or(0);

        if self.write_flag(width == IntWidth::U8) {
            self.write_u8(small as u8);
        } else if self.write_flag(width == IntWidth::U16) {
            self.write_u16(small as u16);
        } else if self.write_flag(width == IntWidth::U32) {
            self.write_u32(small);
        } else {
            self.write_string(&value.to_text(), false)?;
        }

        Ok(width)
    }

    /// Read a number written by `write_int`.
    ///
    /// A text fallback that is not a number decodes as zero in lenient mode.
    /// In strict mode a failed read consumes nothing.
    pub fn read_int(&mut self) -> Result<Number> {
        let width = match self.peek(0, 3) {
            0b100..=0b111 => IntWidth::U8,
            0b010 | 0b011 => IntWidth::U16,
            0b001 => IntWidth::U32,
            _ => IntWidth::Text,
        };
        let flags = width.flag_bits();

        let payload = match width {
            IntWidth::U8 => 8,
            IntWidth::U16 => 16,
            IntWidth::U32 => 32,
            IntWidth::Text => return self.read_int_text(flags),
        };
        let available = self.size();
        if flags + payload > available && self.mode() == ReadMode::Strict {
            return Err(BitStreamError::Underflow { requested: flags + payload, available });
        }

        self.read_bits(flags)?;
        Ok(Number::Int(match width {
            IntWidth::U8 => self.read_u8()? as i128,
            IntWidth::U16 => self.read_u16()? as i128,
            _ => self.read_u32()? as i128,
        }))
    }

    fn read_int_text(&mut self, flags: usize) -> Result<Number> {
        let (text, bits) = self.peek_string(flags)?;
        let number = match text.parse::<Number>() {
            Ok(number) => number,
            Err(err) if self.mode() == ReadMode::Strict => return Err(err),
            Err(_) => {
                if text.is_empty() {
                    debug!("read_int: empty text fallback, reading as 0");
                } else {
                    warn!("read_int: {:?} is not a number, reading as 0", text);
                }
                Number::Int(0)
            }
        };
        self.read_bits(flags + bits)?;
        Ok(number)
    }
}
