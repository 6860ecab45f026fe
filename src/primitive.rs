//! Fixed-width primitive codecs
//!
//! Every value is written MSB-first, left-justified in the source word
//! handed to the engine. Out-of-range inputs are masked to width.

use crate::bit_stream::BitStream;
use crate::error::Result;

impl BitStream {
    /// Write a single bit and return the value written.
    pub fn write_flag(&mut self, value: bool) -> bool {
        self.append(&[if value { 0x8000 } else { 0x0000 }], 1);
        value
    }

    pub fn read_flag(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)?.word(0) & 0x8000 == 0x8000)
    }

    /// Write the low nibble of `value`.
    pub fn write_u4(&mut self, value: u8) {
        self.append(&[((value & 0x0F) as u16) << 12], 4);
    }

    pub fn read_u4(&mut self) -> Result<u8> {
        Ok((self.read_bits(4)?.word(0) >> 12) as u8)
    }

    pub fn write_u8(&mut self, value: u8) {
        self.append(&[(value as u16) << 8], 8);
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok((self.read_bits(8)?.word(0) >> 8) as u8)
    }

    pub fn write_u16(&mut self, value: u16) {
        self.append(&[value], 16);
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.read_bits(16)?.word(0))
    }

    pub fn write_u32(&mut self, value: u32) {
        self.append(&[(value >> 16) as u16, value as u16], 32);
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bits = self.read_bits(32)?;
        Ok(((bits.word(0) as u32) << 16) | bits.word(1) as u32)
    }

    /// Write a value in `[0, 1]` quantized to 8 bits.
    ///
    /// The round trip loses up to 1/255 of precision.
    pub fn write_float(&mut self, value: f32) {
        self.write_u8(quantize(value));
    }

    pub fn read_float(&mut self) -> Result<f32> {
        Ok(self.read_u8()? as f32 / 255.0)
    }
}

#[inline]
fn quantize(value: f32) -> u8 {
    ((value * 255.0).round() as i32 & 0xFF) as u8
}
