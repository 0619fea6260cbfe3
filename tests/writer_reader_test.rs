use result_channel::writer::DEFAULT_CAPACITY;
use result_channel::{deserialize, Codec, CodecError, Reader, Value, Writer};

/// Checks the last `size` bytes written start on an `alignment` boundary and that
/// everything between `before` and that start is zero padding.
fn assert_aligned(writer: &Writer, before: usize, size: usize, alignment: usize) {
    let start = writer.position() - size;
    assert_eq!(start % alignment, 0, "payload at {} not {}-aligned", start, alignment);
    assert!(start - before < alignment);
    assert!(writer.as_slice()[before..start].iter().all(|b| *b == 0));
}

#[test]
fn test_interleaved_writes_are_aligned() {
    let mut writer = Writer::new();
    for text in ["a", "abc", "hello", "xy", "seven77"] {
        writer.write_u8(0x06);
        writer.write_bytes(text.as_bytes());

        let before = writer.position();
        writer.write_u16(0xBEEF);
        assert_aligned(&writer, before, 2, 2);

        writer.write_bytes(b"z");
        let before = writer.position();
        writer.write_i32(-1);
        assert_aligned(&writer, before, 4, 4);

        writer.write_bytes(text.as_bytes());
        let before = writer.position();
        writer.write_i64(i64::MAX);
        assert_aligned(&writer, before, 8, 8);

        writer.write_u8(1);
        let before = writer.position();
        writer.write_f32(1.5);
        assert_aligned(&writer, before, 4, 4);

        writer.write_u8(1);
        let before = writer.position();
        writer.write_f64(2.5);
        assert_aligned(&writer, before, 8, 8);

        writer.write_u8(1);
        let before = writer.position();
        writer.write_i32_array(&[1, 2, 3]);
        assert_aligned(&writer, before, 12, 4);

        writer.write_u8(1);
        let before = writer.position();
        writer.write_i64_array(&[4, 5]);
        assert_aligned(&writer, before, 16, 8);

        writer.write_u8(1);
        let before = writer.position();
        writer.write_f32_array(&[6.0]);
        assert_aligned(&writer, before, 4, 4);

        writer.write_u8(1);
        let before = writer.position();
        writer.write_f64_array(&[7.0, 8.0, 9.0]);
        assert_aligned(&writer, before, 24, 8);
    }
}

#[test]
fn test_array_elements_are_contiguous() {
    let mut writer = Writer::new();
    writer.write_u8(1);
    writer.write_i32_array(&[10, 20, 30]);
    let bytes = writer.finish();
    assert_eq!(bytes.len(), 4 + 12);
    assert_eq!(&bytes[4..8], &10i32.to_ne_bytes());
    assert_eq!(&bytes[8..12], &20i32.to_ne_bytes());
    assert_eq!(&bytes[12..16], &30i32.to_ne_bytes());
}

#[test]
fn test_buffer_growth_preserves_bytes() {
    let mut writer = Writer::new();
    assert_eq!(writer.capacity(), DEFAULT_CAPACITY);

    let chunk: Vec<u8> = (0..=255u8).collect();
    for _ in 0..40 {
        writer.write_bytes(&chunk);
    }
    // 1024 -> 2048 -> 4096 -> 8192 -> 16384
    assert_eq!(writer.capacity(), 16384);
    assert_eq!(writer.position(), 10240);

    let bytes = writer.finish();
    assert_eq!(bytes.len(), 10240);
    for (i, b) in bytes.iter().enumerate() {
        assert_eq!(*b, (i % 256) as u8);
    }
}

#[test]
fn test_growth_after_padding() {
    let mut writer = Writer::with_capacity(8);
    writer.write_bytes(&[0xFF; 7]);
    assert_eq!(writer.capacity(), 8);
    writer.write_i64(42);
    assert_eq!(writer.capacity(), 16);
    let bytes = writer.finish();
    assert_eq!(&bytes[..7], &[0xFFu8; 7]);
    assert_eq!(bytes[7], 0);
    assert_eq!(&bytes[8..], &42i64.to_ne_bytes());
}

#[test]
fn test_zero_capacity_writer_grows() {
    let mut writer = Writer::with_capacity(0);
    assert_eq!(writer.capacity(), 1);
    writer.write_f64(1.0);
    assert_eq!(writer.capacity(), 8);
    assert_eq!(writer.finish().len(), 8);
}

#[test]
fn test_small_initial_capacity_codec() {
    let codec = Codec::new().with_initial_capacity(16);
    let value = Value::Int64Array((0..1000).collect());
    let bytes = codec.serialize(&value).unwrap();
    // tag, 0xFE marker, u16 size, padding to 8, payload
    assert_eq!(bytes.len(), 8 + 8000);
    assert_eq!(codec.deserialize(&bytes).unwrap(), value);
    assert_eq!(deserialize(&bytes).unwrap(), value);
}

#[test]
fn test_reader_skips_padding_without_checking() {
    let mut bytes = vec![0x03, 0xAA, 0xBB, 0xCC];
    bytes.extend_from_slice(&42i32.to_ne_bytes());
    assert_eq!(deserialize(&bytes).unwrap(), Value::Int32(42));
}

#[test]
fn test_reader_borrows_region() {
    let data = b"\x01hello";
    let mut reader = Reader::new(data);
    assert_eq!(reader.read_u8().unwrap(), 1);
    let text = reader.read_str(5).unwrap();
    assert_eq!(text, "hello");
    assert_eq!(text.as_ptr(), data[1..].as_ptr());
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn test_reader_bounds() {
    let data = [1u8, 2, 3];
    let mut reader = Reader::new(&data);
    match reader.read_i32() {
        Err(CodecError::OutOfBounds {
            position,
            needed,
            available,
        }) => {
            assert_eq!((position, needed, available), (0, 4, 3));
        }
        other => panic!("expected OutOfBounds, got {:?}", other),
    }

    let mut reader = Reader::new(&data);
    assert_eq!(reader.read_u8().unwrap(), 1);
    match reader.read_i32() {
        Err(CodecError::OutOfBounds {
            position,
            available,
            ..
        }) => {
            assert_eq!(position, 4);
            assert_eq!(available, 0);
        }
        other => panic!("expected OutOfBounds, got {:?}", other),
    }

    let mut reader = Reader::new(&data);
    assert!(matches!(
        reader.read_i64_array(usize::MAX / 4),
        Err(CodecError::OutOfBounds { .. })
    ));
    assert!(matches!(
        reader.read_bytes(4),
        Err(CodecError::OutOfBounds { .. })
    ));
}

#[test]
fn test_reader_scalars_round_trip() {
    let mut writer = Writer::new();
    writer.write_u8(7);
    writer.write_u16(65535);
    writer.write_i32(i32::MIN);
    writer.write_f32(-0.25);
    writer.write_i64(-1);
    writer.write_f64(f64::MAX);
    let bytes = writer.finish();

    let mut reader = Reader::new(&bytes);
    assert_eq!(reader.read_u8().unwrap(), 7);
    assert_eq!(reader.read_u16().unwrap(), 65535);
    assert_eq!(reader.read_i32().unwrap(), i32::MIN);
    assert_eq!(reader.read_f32().unwrap(), -0.25);
    assert_eq!(reader.read_i64().unwrap(), -1);
    assert_eq!(reader.read_f64().unwrap(), f64::MAX);
    assert_eq!(reader.position(), bytes.len());
}
