//! Tag-length-value self-describing binary codec.
//!
//! A [`Reader`] advances over elements, enters and exits containers, and
//! exposes the current tag/type/value; a [`Writer`] provides the symmetric
//! encode side, including bulk-copy operations for previously encoded
//! container bodies. Container element-type codes and tag-form layout are
//! part of the wire contract and are bit-exact across this codec.

pub mod error;
pub mod reader;
pub mod tag;
pub mod value;
pub mod writer;

pub use error::{TlvError, TlvResult};
pub use reader::Reader;
pub use tag::{ContainerKind, ElementType, Tag};
pub use value::TlvValue;
pub use writer::Writer;

/// Write a [`TlvValue`] tree to a fresh buffer.
pub fn pack(tag: Tag, value: &TlvValue) -> TlvResult<Vec<u8>> {
    let mut w = Writer::new();
    write_value(&mut w, tag, value)?;
    w.finalize()
}

fn write_value(w: &mut Writer, tag: Tag, value: &TlvValue) -> TlvResult<()> {
    match value {
        TlvValue::Signed(v) => w.put_signed(tag, *v),
        TlvValue::Unsigned(v) => w.put_unsigned(tag, *v),
        TlvValue::Bool(v) => w.put_bool(tag, *v),
        TlvValue::Float(v) => w.put_float(tag, *v),
        TlvValue::Utf8String(v) => w.put_utf8_string(tag, v),
        TlvValue::ByteString(v) => w.put_byte_string(tag, v),
        TlvValue::Null => w.put_null(tag),
        TlvValue::Container(kind, children) => {
            w.start_container(tag, *kind);
            for (child_tag, child) in children {
                write_value(w, *child_tag, child)?;
            }
            w.end_container()?;
        }
    }
    Ok(())
}

/// Nesting depth above which `parse` refuses to recurse further, so a
/// maliciously or accidentally deep container tree fails with
/// `TlvError::DepthExceeded` instead of overflowing the call stack.
const MAX_CONTAINER_DEPTH: usize = 64;

/// Parse a single top-level TLV element (and, if it is a container, its
/// full subtree) out of `buf`.
pub fn parse(buf: &[u8]) -> TlvResult<(Tag, TlvValue)> {
    let mut r = Reader::new(buf);
    if !r.next()? {
        return Err(TlvError::invalid_encoding(0, "empty TLV buffer"));
    }
    let tag = r.tag().expect("next() returned true");
    let value = read_value(&mut r, 0)?;
    Ok((tag, value))
}

fn read_value(r: &mut Reader<'_>, depth: usize) -> TlvResult<TlvValue> {
    use tag::ElementType::*;
    let et = r.element_type().expect("called on a positioned reader");
    Ok(match et {
        Int8 | Int16 | Int32 | Int64 => TlvValue::Signed(r.get_i64()?),
        UInt8 | UInt16 | UInt32 | UInt64 => TlvValue::Unsigned(r.get_u64()?),
        BoolFalse | BoolTrue => TlvValue::Bool(r.get_bool()?),
        Float32 | Float64 => TlvValue::Float(r.get_f64()?),
        Utf8String1 | Utf8String2 | Utf8String4 | Utf8String8 => {
            TlvValue::Utf8String(r.get_string()?.to_string())
        }
        ByteString1 | ByteString2 | ByteString4 | ByteString8 => {
            TlvValue::ByteString(r.get_bytes()?.to_vec())
        }
        Null => TlvValue::Null,
        Structure | Array | Path | List => {
            if depth >= MAX_CONTAINER_DEPTH {
                return Err(TlvError::DepthExceeded(depth + 1, MAX_CONTAINER_DEPTH));
            }
            let kind = r.enter_container()?;
            let mut children = Vec::new();
            while r.next()? {
                let child_tag = r.tag().expect("next() returned true");
                children.push((child_tag, read_value(r, depth + 1)?));
            }
            r.exit_container()?;
            TlvValue::Container(kind, children)
        }
        EndOfContainer => {
            return Err(TlvError::invalid_encoding(0, "unexpected end-of-container"))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_scalars() {
        for v in [
            TlvValue::Signed(-42),
            TlvValue::Unsigned(9000),
            TlvValue::Bool(true),
            TlvValue::Bool(false),
            TlvValue::Float(3.5),
            TlvValue::Utf8String("fw.img".to_string()),
            TlvValue::ByteString(vec![1, 2, 3, 4]),
            TlvValue::Null,
        ] {
            let bytes = pack(Tag::Context(1), &v).unwrap();
            let (tag, parsed) = parse(&bytes).unwrap();
            assert_eq!(tag, Tag::Context(1));
            assert_eq!(parsed, v);
        }
    }

    #[test]
    fn round_trips_nested_structure() {
        let value = TlvValue::Container(
            ContainerKind::Structure,
            vec![
                (Tag::Context(1), TlvValue::Unsigned(7)),
                (
                    Tag::Context(2),
                    TlvValue::Container(
                        ContainerKind::Array,
                        vec![
                            (Tag::Anonymous, TlvValue::Signed(1)),
                            (Tag::Anonymous, TlvValue::Signed(2)),
                        ],
                    ),
                ),
            ],
        );
        let bytes = pack(Tag::Anonymous, &value).unwrap();
        let (tag, parsed) = parse(&bytes).unwrap();
        assert_eq!(tag, Tag::Anonymous);
        assert_eq!(parsed, value);
    }

    #[test]
    fn excessively_nested_containers_are_rejected_not_overflowed() {
        let mut value = TlvValue::Unsigned(0);
        for _ in 0..MAX_CONTAINER_DEPTH + 1 {
            value = TlvValue::Container(ContainerKind::Structure, vec![(Tag::Context(1), value)]);
        }
        let bytes = pack(Tag::Anonymous, &value).unwrap();
        let err = parse(&bytes).unwrap_err();
        assert!(matches!(err, TlvError::DepthExceeded(_, _)));
    }

    #[test]
    fn wrong_type_on_get_fails() {
        let bytes = pack(Tag::Anonymous, &TlvValue::Unsigned(5)).unwrap();
        let mut r = Reader::new(&bytes);
        assert!(r.next().unwrap());
        assert!(r.get_string().is_err());
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let bytes = pack(Tag::Anonymous, &TlvValue::ByteString(vec![1, 2, 3])).unwrap();
        let truncated = &bytes[..bytes.len() - 1];
        let mut r = Reader::new(truncated);
        assert!(r.next().unwrap());
        assert!(r.get_bytes().is_err());
    }

    #[test]
    fn put_pre_encoded_container_round_trips() {
        let inner = TlvValue::Container(
            ContainerKind::Structure,
            vec![(Tag::Context(1), TlvValue::Unsigned(1))],
        );
        let inner_bytes = pack(Tag::Context(9), &inner).unwrap();

        let mut r = Reader::new(&inner_bytes);
        r.next().unwrap();
        let (kind, body) = r.container_body().unwrap();

        let mut w = Writer::new();
        w.put_pre_encoded_container(Tag::Context(42), kind, body);
        let rewritten = w.finalize().unwrap();

        let (tag, value) = parse(&rewritten).unwrap();
        assert_eq!(tag, Tag::Context(42));
        assert_eq!(value, inner);
    }

    #[test]
    fn copy_container_rewrites_only_outer_tag() {
        let inner = TlvValue::Container(
            ContainerKind::Array,
            vec![(Tag::Anonymous, TlvValue::Unsigned(1))],
        );
        let inner_bytes = pack(Tag::Context(1), &inner).unwrap();

        let mut reader = Reader::new(&inner_bytes);
        reader.next().unwrap();
        let mut writer = Writer::new();
        writer.copy_container(&mut reader, Tag::Context(2)).unwrap();
        let bytes = writer.finalize().unwrap();

        let (tag, value) = parse(&bytes).unwrap();
        assert_eq!(tag, Tag::Context(2));
        assert_eq!(value, inner);
    }

    proptest::proptest! {
        #[test]
        fn prop_round_trip_unsigned(v: u64) {
            let bytes = pack(Tag::Anonymous, &TlvValue::Unsigned(v)).unwrap();
            let (_, parsed) = parse(&bytes).unwrap();
            prop_assert_eq!(parsed, TlvValue::Unsigned(v));
        }

        #[test]
        fn prop_round_trip_signed(v: i64) {
            let bytes = pack(Tag::Anonymous, &TlvValue::Signed(v)).unwrap();
            let (_, parsed) = parse(&bytes).unwrap();
            prop_assert_eq!(parsed, TlvValue::Signed(v));
        }

        #[test]
        fn prop_round_trip_bytes(v: Vec<u8>) {
            let bytes = pack(Tag::Anonymous, &TlvValue::ByteString(v.clone())).unwrap();
            let (_, parsed) = parse(&bytes).unwrap();
            prop_assert_eq!(parsed, TlvValue::ByteString(v));
        }
    }
}
