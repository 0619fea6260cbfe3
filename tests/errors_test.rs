use result_channel::core::{write_size, TAG_INT64, TAG_LIST, TAG_STRING};
use result_channel::{deserialize, serialize, Codec, CodecError, Value, ValueKind, Writer};

#[test]
fn test_unknown_tag() {
    match deserialize(&[0x0F]) {
        Err(CodecError::CorruptStream { tag, position }) => {
            assert_eq!(tag, 0x0F);
            assert_eq!(position, 0);
        }
        other => panic!("expected CorruptStream, got {:?}", other),
    }

    // list of two: Null, then a bad tag at offset 3
    match deserialize(&[TAG_LIST, 2, 0x00, 0x20]) {
        Err(CodecError::CorruptStream { tag, position }) => {
            assert_eq!(tag, 0x20);
            assert_eq!(position, 3);
        }
        other => panic!("expected CorruptStream, got {:?}", other),
    }

    assert!(matches!(
        deserialize(&[0xFF]),
        Err(CodecError::CorruptStream { tag: 0xFF, .. })
    ));
}

#[test]
fn test_empty_input() {
    match deserialize(&[]) {
        Err(CodecError::OutOfBounds {
            position,
            needed,
            available,
        }) => assert_eq!((position, needed, available), (0, 1, 0)),
        other => panic!("expected OutOfBounds, got {:?}", other),
    }
}

#[test]
fn test_truncated_input() {
    // Int64 with only two payload bytes
    let truncated_int64 = [TAG_INT64, 0, 0, 0, 0, 0, 0, 0, 1, 2];
    match deserialize(&truncated_int64) {
        Err(CodecError::OutOfBounds {
            position,
            needed,
            available,
        }) => assert_eq!((position, needed, available), (8, 8, 2)),
        other => panic!("expected OutOfBounds, got {:?}", other),
    }

    // list announcing three elements but carrying one
    assert!(matches!(
        deserialize(&[TAG_LIST, 3, 0x00]),
        Err(CodecError::OutOfBounds { position: 3, .. })
    ));

    // string announcing five bytes but carrying two
    assert!(matches!(
        deserialize(&[TAG_STRING, 5, b'a', b'b']),
        Err(CodecError::OutOfBounds {
            position: 2,
            needed: 5,
            available: 2
        })
    ));

    // two-byte size marker with the size missing
    assert!(matches!(
        deserialize(&[TAG_STRING, 0xFE]),
        Err(CodecError::OutOfBounds { .. })
    ));

    let full = serialize(&Value::Float64Array(vec![1.0, 2.0, 3.0])).unwrap();
    for end in 0..full.len() {
        assert!(
            matches!(deserialize(&full[..end]), Err(CodecError::OutOfBounds { .. })),
            "prefix of {} bytes",
            end
        );
    }
}

#[test]
fn test_invalid_utf8() {
    let err = deserialize(&[TAG_STRING, 2, 0xFF, 0xFE]).unwrap_err();
    assert!(matches!(err, CodecError::InvalidUtf8(_)));
    assert!(err.to_string().starts_with("Invalid UTF-8 in string payload"));
}

#[test]
fn test_negative_size() {
    let mut bytes = vec![TAG_STRING, 0xFF, 0, 0];
    bytes.extend_from_slice(&(-1i32).to_ne_bytes());
    match deserialize(&bytes) {
        Err(CodecError::InvalidSize(size)) => assert_eq!(size, -1),
        other => panic!("expected InvalidSize, got {:?}", other),
    }
}

fn nested_lists(levels: usize) -> Value {
    (0..levels).fold(Value::Null, |inner, _| Value::List(vec![inner]))
}

#[test]
fn test_depth_limit() {
    let codec = Codec::new().with_max_depth(2);
    assert_eq!(codec.max_depth(), 2);

    let shallow = nested_lists(2);
    let bytes = codec.serialize(&shallow).unwrap();
    assert_eq!(codec.deserialize(&bytes).unwrap(), shallow);

    let deep = nested_lists(3);
    match codec.serialize(&deep) {
        Err(CodecError::DepthLimitExceeded { limit }) => assert_eq!(limit, 2),
        other => panic!("expected DepthLimitExceeded, got {:?}", other),
    }

    let bytes = serialize(&deep).unwrap();
    let err = codec.deserialize(&bytes).unwrap_err();
    assert!(matches!(err, CodecError::DepthLimitExceeded { limit: 2 }));
    assert_eq!(err.to_string(), "Nesting depth exceeds the limit of 2");
    assert_eq!(deserialize(&bytes).unwrap(), deep);
}

#[test]
fn test_default_depth_limit_rejects_runaway_nesting() {
    // 600 nested one-element lists, built by hand
    let mut bytes = Vec::new();
    for _ in 0..600 {
        bytes.extend_from_slice(&[TAG_LIST, 1]);
    }
    bytes.push(0x00);
    assert!(matches!(
        deserialize(&bytes),
        Err(CodecError::DepthLimitExceeded { limit: 512 })
    ));
}

#[test]
fn test_unsupported_integers() {
    match Value::try_from(u64::MAX) {
        Err(CodecError::UnsupportedType(message)) => assert!(message.contains("u64")),
        other => panic!("expected UnsupportedType, got {:?}", other),
    }
    assert!(matches!(
        Value::try_from(i128::MAX),
        Err(CodecError::UnsupportedType(_))
    ));
    assert!(matches!(
        Value::try_from(u128::from(u64::MAX)),
        Err(CodecError::UnsupportedType(_))
    ));
    assert!(Value::try_from(i64::MAX as u64).is_ok());
}

#[test]
fn test_size_overflow() {
    let mut writer = Writer::new();
    let too_big = i32::MAX as usize + 1;
    match write_size(&mut writer, too_big) {
        Err(CodecError::SizeOverflow(size)) => assert_eq!(size, too_big),
        other => panic!("expected SizeOverflow, got {:?}", other),
    }
    assert!(write_size(&mut writer, i32::MAX as usize).is_ok());
}

#[test]
fn test_error_messages() {
    let corrupt = CodecError::CorruptStream {
        tag: 0x0F,
        position: 0,
    };
    assert_eq!(
        corrupt.to_string(),
        "Message corrupted: unknown tag 0x0F at offset 0"
    );
    let bounds = CodecError::OutOfBounds {
        position: 8,
        needed: 8,
        available: 2,
    };
    assert_eq!(
        bounds.to_string(),
        "Insufficient data: need 8 bytes at offset 8, 2 available"
    );
    assert_eq!(
        CodecError::InvalidSize(-1).to_string(),
        "Invalid size field: -1"
    );
    assert_eq!(
        CodecError::InvalidKey {
            kind: ValueKind::Set
        }
        .to_string(),
        "Set cannot be used as a map key in the target representation"
    );
    assert_eq!(
        CodecError::UnsupportedType("u128".into()).to_string(),
        "Unsupported type: u128"
    );
}
