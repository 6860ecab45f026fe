//! Adaptive Text Codec
//!
//! A string is classified into the narrowest of six alphabets covering all
//! of its UTF-16 code units, then written as a 4-bit alphabet id, a 16-bit
//! length and one symbol per code unit at the alphabet's width.

use log::{debug, warn};

use crate::bit_stream::BitStream;
use crate::config::ReadMode;
use crate::error::{BitStreamError, Result};

/// Longest string, in UTF-16 code units, the 16-bit length prefix can carry.
pub const MAX_TEXT_UNITS: usize = u16::MAX as usize;

/// Bits spent on the alphabet id and length prefix.
pub const TEXT_HEADER_BITS: usize = 4 + 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alphabet {
    /// Raw 16-bit code units.
    Utf16 = 0,
    /// Code units up to 255, 8 bits.
    Latin1 = 1,
    /// Code units up to 127, 7 bits.
    Ascii = 2,
    /// `0-9 A-Z a-z , space`, 6 bits.
    Alphanumeric = 3,
    /// `a-z space | ' - . ,`, 5 bits.
    Lowercase = 4,
    /// `+ , - . 0-9 space`, 4 bits.
    Numeric = 5,
}

/// Narrowest first; the first alphabet covering every unit wins.
const PRECEDENCE: [Alphabet; 6] = [
    Alphabet::Numeric,
    Alphabet::Lowercase,
    Alphabet::Alphanumeric,
    Alphabet::Ascii,
    Alphabet::Latin1,
    Alphabet::Utf16,
];

const SPACE: u16 = b' ' as u16;

impl Alphabet {
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Map a discriminator back to an alphabet. Unknown ids decode as `Utf16`.
    pub fn from_id(id: u8) -> Self {
        match id {
            1 => Alphabet::Latin1,
            2 => Alphabet::Ascii,
            3 => Alphabet::Alphanumeric,
            4 => Alphabet::Lowercase,
            5 => Alphabet::Numeric,
            _ => Alphabet::Utf16,
        }
    }

    /// Bits per symbol.
    pub fn bit_width(self) -> usize {
        match self {
            Alphabet::Utf16 => 16,
            Alphabet::Latin1 => 8,
            Alphabet::Ascii => 7,
            Alphabet::Alphanumeric => 6,
            Alphabet::Lowercase => 5,
            Alphabet::Numeric => 4,
        }
    }

    /// Whether this alphabet has a symbol for `unit`.
    pub fn covers(self, unit: u16) -> bool {
        match self {
            // 47 ('/') sits inside the range but its slot carries the space
            Alphabet::Numeric => ((43..=57).contains(&unit) && unit != 47) || unit == SPACE,
            Alphabet::Lowercase => {
                is_between(unit, b'a', b'z') || matches!(unit, 32 | 124 | 39 | 45 | 46 | 44)
            }
            Alphabet::Alphanumeric => {
                is_between(unit, b'0', b'9')
                    || is_between(unit, b'A', b'Z')
                    || is_between(unit, b'a', b'z')
                    || unit == b',' as u16
                    || unit == SPACE
            }
            Alphabet::Ascii => unit <= 127,
            Alphabet::Latin1 => unit <= 255,
            Alphabet::Utf16 => true,
        }
    }

    /// Pick the narrowest alphabet covering every unit.
    pub fn classify(units: &[u16]) -> Self {
        PRECEDENCE
            .into_iter()
            .find(|alphabet| units.iter().all(|&unit| alphabet.covers(unit)))
            .unwrap_or(Alphabet::Utf16)
    }

    /// Symbol for a covered code unit.
    fn encode(self, unit: u16) -> u16 {
        match self {
            Alphabet::Numeric => {
                if unit == SPACE {
                    4
                } else {
                    unit.wrapping_sub(43)
                }
            }
            Alphabet::Lowercase => match unit {
                32 => 26,
                124 => 27,
                39 => 28,
                45 => 29,
                46 => 30,
                44 => 31,
                _ => unit.wrapping_sub(97),
            },
            Alphabet::Alphanumeric => match unit {
                44 => 62,
                32 => 63,
                _ => {
                    let mut symbol = unit.wrapping_sub(48);
                    if symbol >= 17 {
                        symbol -= 7;
                    }
                    if symbol >= 42 {
                        symbol -= 6;
                    }
                    symbol
                }
            },
            Alphabet::Ascii | Alphabet::Latin1 | Alphabet::Utf16 => unit,
        }
    }

    /// Code unit for a symbol.
    fn decode(self, symbol: u16) -> u16 {
        match self {
            Alphabet::Numeric => {
                if symbol == 4 {
                    SPACE
                } else {
                    symbol + 43
                }
            }
            Alphabet::Lowercase => match symbol {
                26 => 32,
                27 => 124,
                28 => 39,
                29 => 45,
                30 => 46,
                31 => 44,
                _ => symbol + 97,
            },
            Alphabet::Alphanumeric => match symbol {
                62 => 44,
                63 => 32,
                _ => {
                    let mut unit = symbol + 48;
                    if unit >= 58 {
                        unit += 7;
                    }
                    if unit >= 91 {
                        unit += 6;
                    }
                    unit
                }
            },
            Alphabet::Ascii | Alphabet::Latin1 | Alphabet::Utf16 => symbol,
        }
    }

    /// Total encoded size of a string of `units` code units.
    pub fn encoded_bits(self, units: usize) -> usize {
        TEXT_HEADER_BITS + units * self.bit_width()
    }
}

#[inline]
fn is_between(unit: u16, low: u8, high: u8) -> bool {
    (low as u16..=high as u16).contains(&unit)
}

/// Classify a string as `write_string` would.
pub fn classify(text: &str) -> Alphabet {
    let units: Vec<u16> = text.encode_utf16().collect();
    Alphabet::classify(&units)
}

/// Bits a lenient `write_string` spends on `text`, truncation included.
pub fn text_encoded_bits(text: &str) -> usize {
    let mut units: Vec<u16> = text.encode_utf16().collect();
    truncate_units(&mut units);
    Alphabet::classify(&units).encoded_bits(units.len())
}

/// Cut `units` to what the length prefix can carry, never splitting a
/// surrogate pair.
fn truncate_units(units: &mut Vec<u16>) {
    if units.len() <= MAX_TEXT_UNITS {
        return;
    }
    let mut len = MAX_TEXT_UNITS;
    if (0xD800..=0xDBFF).contains(&units[len - 1]) {
        len -= 1;
    }
    units.truncate(len);
}

impl BitStream {
    /// Write a string in the narrowest alphabet that covers it.
    ///
    /// With `fold_case` the string is lowercased first, which often lets it
    /// use the 5-bit alphabet; the original case is lost. Strings longer than
    /// 65535 UTF-16 code units are truncated in lenient mode and rejected in
    /// strict mode.
    pub fn write_string(&mut self, value: &str, fold_case: bool) -> Result<Alphabet> {
        let mut units: Vec<u16> = if fold_case {
            value.to_lowercase().encode_utf16().collect()
        } else {
            value.encode_utf16().collect()
        };

        if units.len() > MAX_TEXT_UNITS {
            if self.mode() == ReadMode::Strict {
                return Err(BitStreamError::StringTooLong(units.len()));
            }
            let total = units.len();
            truncate_units(&mut units);
            warn!("write_string: truncating {} code units to {}", total, units.len());
        }

        let alphabet = Alphabet::classify(&units);
        let width = alphabet.bit_width();

        self.write_u4(alphabet.id());
        self.write_u16(units.len() as u16);
        for unit in units {
            let symbol = alphabet.encode(unit);
            self.append(&[symbol << (16 - width)], width);
        }

        Ok(alphabet)
    }

    /// Read a string written by `write_string`.
    ///
    /// In strict mode a failed read consumes nothing.
    pub fn read_string(&mut self) -> Result<String> {
        let (text, bits) = self.peek_string(0)?;
        self.read_bits(bits)?;
        Ok(text)
    }

    /// Decode the string starting `skip` bits past the head without
    /// consuming it. Returns the text and the bits it spans.
    pub(crate) fn peek_string(&self, skip: usize) -> Result<(String, usize)> {
        let id = self.peek(skip, 4) as u8;
        let alphabet = Alphabet::from_id(id);
        if alphabet.id() != id {
            debug!("read_string: unknown alphabet id {}, decoding as UTF-16", id);
        }

        let len = self.peek(skip + 4, 16) as usize;
        let width = alphabet.bit_width();
        let bits = alphabet.encoded_bits(len);

        let available = self.size();
        if skip + bits > available && self.mode() == ReadMode::Strict {
            return Err(BitStreamError::Underflow { requested: skip + bits, available });
        }

        let start = skip + TEXT_HEADER_BITS;
        let units: Vec<u16> = (0..len)
            .map(|i| alphabet.decode(self.peek(start + i * width, width) as u16))
            .collect();

        let text = match self.mode() {
            ReadMode::Strict => String::from_utf16(&units)?,
            ReadMode::Lenient => String::from_utf16_lossy(&units),
        };
        Ok((text, bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(text: &str) -> (Alphabet, String, usize) {
        let mut stream = BitStream::new();
        let alphabet = stream.write_string(text, false).unwrap();
        let bits = stream.size();
        let decoded = stream.read_string().unwrap();
        assert_eq!(stream.size(), 0);
        (alphabet, decoded, bits)
    }

    #[test]
    fn test_numeric_alphabet() {
        let (alphabet, decoded, bits) = round_trip("-92");
        assert_eq!(alphabet, Alphabet::Numeric);
        assert_eq!(decoded, "-92");
        assert_eq!(bits, 20 + 3 * 4);

        let (alphabet, decoded, _) = round_trip("+1 555.0, 12");
        assert_eq!(alphabet, Alphabet::Numeric);
        assert_eq!(decoded, "+1 555.0, 12");
    }

    #[test]
    fn test_slash_is_not_numeric() {
        assert!(!Alphabet::Numeric.covers(b'/' as u16));
        assert_eq!(classify("1/2"), Alphabet::Ascii);

        let (_, decoded, _) = round_trip("1/2");
        assert_eq!(decoded, "1/2");
    }

    #[test]
    fn test_lowercase_alphabet() {
        let (alphabet, decoded, bits) = round_trip("alpha, beta, gamma, delta");
        assert_eq!(alphabet, Alphabet::Lowercase);
        assert_eq!(decoded, "alpha, beta, gamma, delta");
        assert_eq!(bits, 20 + 25 * 5);

        let (alphabet, decoded, _) = round_trip("it's a well-known fact. |");
        assert_eq!(alphabet, Alphabet::Lowercase);
        assert_eq!(decoded, "it's a well-known fact. |");
    }

    #[test]
    fn test_alphanumeric_alphabet() {
        let (alphabet, decoded, _) = round_trip("Apokaliptic tests");
        assert_eq!(alphabet, Alphabet::Alphanumeric);
        assert_eq!(decoded, "Apokaliptic tests");

        let all = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz, ";
        let (alphabet, decoded, _) = round_trip(all);
        assert_eq!(alphabet, Alphabet::Alphanumeric);
        assert_eq!(decoded, all);
    }

    #[test]
    fn test_alphanumeric_symbols_are_dense() {
        let symbols: Vec<u16> = "09AZaz, "
            .encode_utf16()
            .map(|unit| Alphabet::Alphanumeric.encode(unit))
            .collect();
        assert_eq!(symbols, vec![0, 9, 10, 35, 36, 61, 62, 63]);
    }

    #[test]
    fn test_ascii_alphabet() {
        let (alphabet, decoded, _) = round_trip("Nothing to see here!");
        assert_eq!(alphabet, Alphabet::Ascii);
        assert_eq!(decoded, "Nothing to see here!");
    }

    #[test]
    fn test_latin1_alphabet() {
        let (alphabet, decoded, _) = round_trip("Próba ékezettel.");
        assert_eq!(alphabet, Alphabet::Latin1);
        assert_eq!(decoded, "Próba ékezettel.");
    }

    #[test]
    fn test_utf16_alphabet() {
        let (alphabet, decoded, _) = round_trip("Árvíztűrő tükörfúrógép.");
        assert_eq!(alphabet, Alphabet::Utf16);
        assert_eq!(decoded, "Árvíztűrő tükörfúrógép.");
    }

    #[test]
    fn test_surrogate_pairs_round_trip() {
        let (alphabet, decoded, bits) = round_trip("bits 🦀");
        assert_eq!(alphabet, Alphabet::Utf16);
        assert_eq!(decoded, "bits 🦀");
        // The crab is two code units
        assert_eq!(bits, 20 + 7 * 16);
    }

    #[test]
    fn test_empty_string() {
        let (alphabet, decoded, bits) = round_trip("");
        assert_eq!(alphabet, Alphabet::Numeric);
        assert_eq!(decoded, "");
        assert_eq!(bits, TEXT_HEADER_BITS);
    }

    #[test]
    fn test_fold_case() {
        let mut stream = BitStream::new();
        let alphabet = stream.write_string("Hello World", true).unwrap();
        assert_eq!(alphabet, Alphabet::Lowercase);
        assert_eq!(stream.read_string().unwrap(), "hello world");
    }

    #[test]
    fn test_unknown_alphabet_id_decodes_as_utf16() {
        let mut stream = BitStream::new();
        stream.write_u4(9);
        stream.write_u16(2);
        stream.write_u16('h' as u16);
        stream.write_u16('i' as u16);
        assert_eq!(stream.read_string().unwrap(), "hi");
    }

    #[test]
    fn test_exhausted_stream_reads_empty_string() {
        let mut stream = BitStream::new();
        assert_eq!(stream.read_string().unwrap(), "");
    }

    #[test]
    fn test_truncated_string_fails_when_strict() {
        let mut stream = BitStream::strict();
        stream.write_u4(Alphabet::Ascii.id());
        stream.write_u16(3);
        stream.write_bits(&[(b'a' as u16) << 9], 7).unwrap();
        assert!(matches!(
            stream.read_string(),
            Err(BitStreamError::Underflow { requested: 41, available: 27 })
        ));
        // Nothing was consumed
        assert_eq!(stream.size(), 27);
        assert_eq!(stream.read_u4().unwrap(), Alphabet::Ascii.id());
        assert_eq!(stream.read_u16().unwrap(), 3);
    }

    #[test]
    fn test_short_header_fails_when_strict() {
        let mut stream = BitStream::strict();
        stream.write_u4(Alphabet::Numeric.id());
        stream.write_u8(0);
        assert!(matches!(stream.read_string(), Err(BitStreamError::Underflow { .. })));
        assert_eq!(stream.size(), 12);
    }

    #[test]
    fn test_lone_surrogate_fails_when_strict() {
        let mut stream = BitStream::strict();
        stream.write_u4(Alphabet::Utf16.id());
        stream.write_u16(1);
        stream.write_u16(0xD800);
        assert!(matches!(stream.read_string(), Err(BitStreamError::InvalidText(_))));
        assert_eq!(stream.size(), 36);
    }

    #[test]
    fn test_lone_surrogate_is_replaced_when_lenient() {
        let mut stream = BitStream::new();
        stream.write_u4(Alphabet::Utf16.id());
        stream.write_u16(1);
        stream.write_u16(0xD800);
        assert_eq!(stream.read_string().unwrap(), "\u{FFFD}");
    }

    #[test]
    fn test_overlong_string() {
        let long = "a".repeat(MAX_TEXT_UNITS + 10);

        let mut strict = BitStream::strict();
        assert!(matches!(
            strict.write_string(&long, false),
            Err(BitStreamError::StringTooLong(65545))
        ));
        assert_eq!(strict.size(), 0);

        let mut lenient = BitStream::new();
        lenient.write_string(&long, false).unwrap();
        assert_eq!(lenient.read_string().unwrap().len(), MAX_TEXT_UNITS);
        assert_eq!(lenient.size(), 0);
    }

    #[test]
    fn test_truncation_keeps_surrogate_pairs_whole() {
        let long = "a".repeat(MAX_TEXT_UNITS - 1) + "🦀";

        let mut stream = BitStream::new();
        stream.write_string(&long, false).unwrap();
        assert_eq!(stream.size(), text_encoded_bits(&long));

        let decoded = stream.read_string().unwrap();
        assert_eq!(decoded, "a".repeat(MAX_TEXT_UNITS - 1));
        assert!(!decoded.contains('\u{FFFD}'));
    }

    #[test]
    fn test_encoded_bits_matches_stream_size() {
        for text in ["", "42", "abc", "Abc", "A~c", "é", "ű"] {
            let mut stream = BitStream::new();
            let alphabet = stream.write_string(text, false).unwrap();
            let units = text.encode_utf16().count();
            assert_eq!(alphabet.encoded_bits(units), stream.size(), "{:?}", text);
        }
    }
}
