use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mcsentinel::codec::{decode_varint, encode_varint, frame};
use mcsentinel::protocol::encode_handshake;

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("varint_encode", |b| {
        b.iter(|| {
            let mut buf = Vec::new();
            encode_varint(black_box(2_097_151), &mut buf);
            buf
        })
    });

    let mut encoded = Vec::new();
    encode_varint(2_097_151, &mut encoded);
    c.bench_function("varint_decode", |b| {
        b.iter(|| decode_varint(black_box(&encoded)).unwrap())
    });

    c.bench_function("handshake_frame", |b| {
        b.iter(|| {
            let packet = encode_handshake(black_box(47), "mc.example.org", 25565, 1);
            frame(&packet)
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
