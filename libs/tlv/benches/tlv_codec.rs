use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tlv::{pack, parse, ContainerKind, Tag, TlvValue};

fn sample_structure() -> TlvValue {
    TlvValue::Container(
        ContainerKind::Structure,
        vec![
            (Tag::Context(1), TlvValue::Unsigned(0x18B4_3000_0000_00AA)),
            (Tag::Context(2), TlvValue::Utf8String("fw.img".to_string())),
            (Tag::Context(3), TlvValue::ByteString(vec![0u8; 32])),
        ],
    )
}

fn bench_pack(c: &mut Criterion) {
    let value = sample_structure();
    c.bench_function("tlv_pack_structure", |b| {
        b.iter(|| pack(Tag::Anonymous, black_box(&value)).unwrap())
    });
}

fn bench_parse(c: &mut Criterion) {
    let bytes = pack(Tag::Anonymous, &sample_structure()).unwrap();
    c.bench_function("tlv_parse_structure", |b| {
        b.iter(|| parse(black_box(&bytes)).unwrap())
    });
}

criterion_group!(benches, bench_pack, bench_parse);
criterion_main!(benches);
