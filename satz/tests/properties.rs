use proptest::prelude::*;
use satz::{record, ByteOrder, Codec, DecodeError};

record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Frame {
        id: u32,
        #[satz("length:8")]
        name: String,
        #[satz("length:3")]
        samples: Vec<i16>,
        ratio: f64,
        offset: Option<i32>,
        corners: [u8; 4],
        #[satz("-")]
        scratch: u64,
        active: bool,
        header: Header,
    }
}

record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Header {
        kind: i8,
        #[satz("length:2")]
        flags: Vec<u16>,
    }
}

const WIDTH: usize = 4 + 8 + 6 + 8 + 4 + 4 + 1 + 1 + 4;

fn orders() -> impl Strategy<Value = ByteOrder> {
    prop_oneof![Just(ByteOrder::LittleEndian), Just(ByteOrder::BigEndian)]
}

/// Frames which survive a round trip unchanged: text without zero bytes that fits, sequences of exactly their length,
/// present optionals and no skipped data.
fn canonical_frames() -> impl Strategy<Value = Frame> {
    (
        any::<u32>(),
        "[a-zA-Z0-9 ]{0,8}",
        prop::collection::vec(any::<i16>(), 3),
        -1.0e9f64..1.0e9,
        any::<i32>(),
        any::<[u8; 4]>(),
        any::<bool>(),
        (any::<i8>(), prop::collection::vec(any::<u16>(), 2)),
    ).prop_map(|(id, name, samples, ratio, offset, corners, active, (kind, flags))| Frame {
        id,
        name,
        samples,
        ratio,
        offset: Some(offset),
        corners,
        scratch: 0,
        active,
        header: Header { kind, flags },
    })
}

fn any_frames() -> impl Strategy<Value = Frame> {
    (
        canonical_frames(),
        ".{0,20}",
        prop::collection::vec(any::<i16>(), 0..10),
        prop::option::of(any::<i32>()),
        any::<u64>(),
        prop::collection::vec(any::<u16>(), 0..5),
    ).prop_map(|(frame, name, samples, offset, scratch, flags)| Frame {
        name,
        samples,
        offset,
        scratch,
        header: Header { flags, ..frame.header },
        ..frame
    })
}

proptest! {
    #[test]
    fn round_trip(frame in canonical_frames(), order in orders()) {
        let codec = Codec::new();
        let bytes = codec.encode(&frame, order).unwrap();
        let (decoded, consumed) = codec.decode_new::<Frame>(&bytes, order).unwrap();
        prop_assert_eq!(WIDTH, consumed);
        prop_assert_eq!(frame, decoded);
    }

    #[test]
    fn fixed_width(frame in any_frames(), order in orders()) {
        let codec = Codec::new();
        prop_assert_eq!(WIDTH, codec.size_of::<Frame>().unwrap());
        prop_assert_eq!(WIDTH, codec.encode(&frame, order).unwrap().len());
    }

    #[test]
    fn skipped_fields_do_not_matter(frame in canonical_frames(), scratch in any::<u64>(), order in orders()) {
        let codec = Codec::new();
        let other = Frame { scratch, ..frame.clone() };
        prop_assert_eq!(codec.encode(&frame, order).unwrap(), codec.encode(&other, order).unwrap());

        let bytes = codec.encode(&frame, order).unwrap();
        let mut destination = other.clone();
        codec.decode(&bytes, order, &mut destination).unwrap();
        prop_assert_eq!(scratch, destination.scratch);
    }

    #[test]
    fn short_input_is_truncated(frame in canonical_frames(), cut in 0..WIDTH, order in orders()) {
        let codec = Codec::new();
        let bytes = codec.encode(&frame, order).unwrap();
        let err = codec.decode_new::<Frame>(&bytes[..cut], order).unwrap_err();
        prop_assert!(matches!(err.inner().root(), DecodeError::Truncated { .. }), "expected DecodeError::Truncated");
    }

    #[test]
    fn arbitrary_input_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64), order in orders()) {
        let _ = Codec::new().decode_new::<Frame>(&bytes, order);
    }
}
