//! Integration Tests for the densebits codecs
//!
//! These tests drive long mixed sequences of writes and reads through the
//! public API, the way an application defines and consumes a wire layout.

use densebits::{
    decode_fields, encode_fields, Alphabet, BitStream, BitStreamError, FieldKind, FieldValue,
    Frame, IntWidth, Number, ReadMode, StreamConfig,
};

const FLOAT_THRESHOLD: f32 = 1.0 / 255.0;

// =============================================================================
// Mixed Sequence Tests
// =============================================================================

#[test]
fn test_mixed_sequence_round_trip() {
    let mut stream = BitStream::new();

    stream.write_int(3u32).unwrap();
    stream.write_string("alpha, beta, gamma, delta", false).unwrap();
    stream.write_int(519u32).unwrap();
    stream.write_int(0x0125_6789u32).unwrap();
    stream.write_u4(0x0C);
    stream.write_flag(true);
    stream.write_u16(0xA987);
    stream.write_string("Nothing to see here!", false).unwrap();
    stream.write_u8(0x52);
    stream.write_flag(false);
    stream.write_flag(true);
    stream.write_flag(false);
    stream.write_string("Apokaliptic tests", false).unwrap();
    stream.write_u32(0x8181_8181);

    assert_eq!(stream.read_int().unwrap(), Number::Int(3));
    assert_eq!(stream.read_string().unwrap(), "alpha, beta, gamma, delta");
    assert_eq!(stream.read_int().unwrap(), Number::Int(519));
    assert_eq!(stream.read_int().unwrap(), Number::Int(0x0125_6789));
    assert_eq!(stream.read_u4().unwrap(), 0x0C);
    assert!(stream.read_flag().unwrap());
    assert_eq!(stream.read_u16().unwrap(), 0xA987);
    assert_eq!(stream.read_string().unwrap(), "Nothing to see here!");
    assert_eq!(stream.read_u8().unwrap(), 0x52);
    assert!(!stream.read_flag().unwrap());
    assert!(stream.read_flag().unwrap());
    assert!(!stream.read_flag().unwrap());
    assert_eq!(stream.read_string().unwrap(), "Apokaliptic tests");
    assert_eq!(stream.read_u32().unwrap(), 0x8181_8181);

    assert_eq!(stream.size(), 0);
}

#[test]
fn test_extended_sequence_all_alphabets() {
    let mut stream = BitStream::strict();

    stream.write_u4(0x03);
    stream.write_flag(true);
    stream.write_u16(0x9933);
    stream.write_float(0.5);
    stream.write_u8(0xA7);
    stream.write_flag(true);
    assert_eq!(stream.write_string("Árvíztűrő tükörfúrógép.", false).unwrap(), Alphabet::Utf16);
    stream.write_flag(true);
    stream.write_flag(false);
    stream.write_u32(0x2623_BF23);
    stream.write_flag(true);
    stream.write_u16(0x771F);
    stream.write_float(0.134);
    stream.write_float(0.771);
    stream.write_u8(0x11);
    assert_eq!(stream.write_string("-92", false).unwrap(), Alphabet::Numeric);
    stream.write_flag(false);
    stream.write_flag(false);
    stream.write_flag(true);
    assert_eq!(stream.write_string("Próba ékezettel.", false).unwrap(), Alphabet::Latin1);
    stream.write_u32(0x7771_1CCB);

    assert_eq!(stream.read_u4().unwrap(), 0x03);
    assert!(stream.read_flag().unwrap());
    assert_eq!(stream.read_u16().unwrap(), 0x9933);
    assert!((stream.read_float().unwrap() - 0.5).abs() < FLOAT_THRESHOLD);
    assert_eq!(stream.read_u8().unwrap(), 0xA7);
    assert!(stream.read_flag().unwrap());
    assert_eq!(stream.read_string().unwrap(), "Árvíztűrő tükörfúrógép.");
    assert!(stream.read_flag().unwrap());
    assert!(!stream.read_flag().unwrap());
    assert_eq!(stream.read_u32().unwrap(), 0x2623_BF23);
    assert!(stream.read_flag().unwrap());
    assert_eq!(stream.read_u16().unwrap(), 0x771F);
    assert!((stream.read_float().unwrap() - 0.134).abs() < FLOAT_THRESHOLD);
    assert!((stream.read_float().unwrap() - 0.771).abs() < FLOAT_THRESHOLD);
    assert_eq!(stream.read_u8().unwrap(), 0x11);
    assert_eq!(stream.read_string().unwrap(), "-92");
    assert!(!stream.read_flag().unwrap());
    assert!(!stream.read_flag().unwrap());
    assert!(stream.read_flag().unwrap());
    assert_eq!(stream.read_string().unwrap(), "Próba ékezettel.");
    assert_eq!(stream.read_u32().unwrap(), 0x7771_1CCB);

    assert_eq!(stream.size(), 0);
    assert!(matches!(stream.read_flag(), Err(BitStreamError::Underflow { .. })));
}

#[test]
fn test_compact_int_boundaries_in_one_stream() {
    let values: [u64; 6] = [255, 256, 65535, 65536, 4_294_967_295, 4_294_967_296];
    let widths = [
        IntWidth::U8,
        IntWidth::U16,
        IntWidth::U16,
        IntWidth::U32,
        IntWidth::U32,
        IntWidth::Text,
    ];

    let mut stream = BitStream::new();
    for (value, width) in values.iter().zip(widths) {
        assert_eq!(stream.write_int(*value).unwrap(), width);
    }
    for value in values {
        assert_eq!(stream.read_int().unwrap().as_u64(), Some(value));
    }
    assert!(stream.is_empty());
}

#[test]
fn test_interleaved_writes_and_reads() {
    let mut stream = BitStream::new();

    stream.write_u16(0x1234);
    stream.write_flag(true);
    assert_eq!(stream.read_u8().unwrap(), 0x12);
    assert_eq!(stream.size(), 9);

    stream.write_string("mid stream", true).unwrap();
    assert_eq!(stream.read_u8().unwrap(), 0x34);
    assert!(stream.read_flag().unwrap());

    stream.write_int(-7i32).unwrap();
    assert_eq!(stream.read_string().unwrap(), "mid stream");
    assert_eq!(stream.read_int().unwrap(), Number::Int(-7));
    assert_eq!(stream.size(), 0);

    // A drained stream is reusable
    stream.write_u32(0xDEAD_BEEF);
    assert_eq!(stream.size(), 32);
    assert_eq!(stream.read_u32().unwrap(), 0xDEAD_BEEF);
}

#[test]
fn test_identical_sequences_are_bit_identical() {
    let encode = || {
        let mut stream = BitStream::new();
        stream.write_int(0x0125_6789u32).unwrap();
        stream.write_string("alpha, beta, gamma, delta", false).unwrap();
        stream.write_float(0.771);
        stream.write_int(-1.5f64).unwrap();
        stream.to_words()
    };

    let first = encode();
    let second = encode();
    assert_eq!(first, second);
}

#[test]
fn test_exhausted_stream_degrades_to_zero() {
    let mut stream = BitStream::new();
    stream.write_u4(0x9);
    assert_eq!(stream.read_u4().unwrap(), 0x9);

    assert!(!stream.read_flag().unwrap());
    assert_eq!(stream.read_u32().unwrap(), 0);
    assert_eq!(stream.read_int().unwrap(), Number::Int(0));
    assert_eq!(stream.read_string().unwrap(), "");
    assert_eq!(stream.read_float().unwrap(), 0.0);
    assert_eq!(stream.size(), 0);
}

#[test]
fn test_mode_can_switch_mid_stream() {
    let mut stream = BitStream::new();
    stream.write_u8(0x52);
    assert_eq!(stream.read_u16().unwrap(), 0x5200);

    stream.set_mode(ReadMode::Strict);
    assert!(stream.read_u8().is_err());
}

// =============================================================================
// Frame and Field Tests
// =============================================================================

#[test]
fn test_fields_through_frame() {
    let fields_json = r#"[
        {"type": "int", "value": 3},
        {"type": "text", "value": "alpha, beta, gamma, delta"},
        {"type": "int", "value": 519},
        {"type": "u4", "value": 12},
        {"type": "flag", "value": true},
        {"type": "u16", "value": 43399},
        {"type": "int", "value": -92},
        {"type": "u32", "value": 2172748161}
    ]"#;
    let fields: Vec<FieldValue> = serde_json::from_str(fields_json).unwrap();
    let kinds: Vec<FieldKind> = fields.iter().map(FieldValue::kind).collect();

    let config = StreamConfig::strict();
    let stream = encode_fields(&fields, &config).unwrap();

    let frame_json = Frame::from_stream(&stream).to_json().unwrap();
    let frame = Frame::from_json(&frame_json).unwrap();
    assert_eq!(frame.bits, stream.size());
    assert_eq!(frame.hex.len(), stream.size().div_ceil(8) * 2);

    let mut received = frame.into_stream(&config).unwrap();
    let decoded = decode_fields(&mut received, &kinds).unwrap();
    assert_eq!(decoded, fields);
}

#[test]
fn test_wrong_schema_is_detected_when_strict() {
    let fields = vec![FieldValue::U8(1), FieldValue::Text("abc".to_string())];
    let mut stream = encode_fields(&fields, &StreamConfig::strict()).unwrap();

    let result = decode_fields(&mut stream, &[FieldKind::U8, FieldKind::U32, FieldKind::U32]);
    assert!(matches!(result, Err(BitStreamError::Underflow { .. })));
}

#[test]
fn test_config_from_json_drives_stream() {
    let config = StreamConfig::from_json(r#"{"mode": "strict"}"#).unwrap();
    let mut stream = BitStream::with_config(&config);
    assert_eq!(stream.mode(), ReadMode::Strict);
    assert!(matches!(stream.write_bits(&[0x0000], 20), Err(BitStreamError::Overflow { .. })));
}
