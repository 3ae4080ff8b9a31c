use rand::Rng;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rtcm3::bits::BitCursor;
use rtcm3::framing::{crc24q, frame, FrameExtractor};
use rtcm3::messages::{Decode, Fields, Msm7};
use rtcm3::Registry;

/// Pack `(value, width)` fields MSB-first.
fn pack(fields: &[(u64, u8)]) -> Vec<u8> {
    let mut bits: Vec<bool> = Vec::default();
    for &(value, width) in fields {
        bits.extend((0..width).rev().map(|i| (value >> i) & 1 == 1));
    }
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, b)| acc | (u8::from(*b) << (7 - i)))
        })
        .collect()
}

// 12 satellites, 2 signals, all cells present
fn msm7_payload() -> Vec<u8> {
    let mut fields = vec![
        (1077, 12),
        (1, 12),
        (0, 30),
        (0, 1),
        (0, 3),
        (0, 7),
        (0, 2),
        (0, 2),
        (0, 1),
        (0, 3),
        (0xfff, 64),
        (0b11, 32),
    ];
    fields.extend(std::iter::repeat((1, 1)).take(24));
    fields.extend(std::iter::repeat((0x1234, 36)).take(12));
    let mut payload = pack(&fields);
    // signal blocks
    payload.resize(Msm7::bit_len(12, 2).div_ceil(8), 0xaa);
    payload
}

fn bench_crc(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let mut buf = [0u8; 1026];
    rng.fill(&mut buf[..]);

    let mut group = c.benchmark_group("crc");
    group.throughput(Throughput::Bytes(buf.len() as u64));
    group.bench_function("crc24q", |b| {
        b.iter(|| crc24q(&buf));
    });
    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let mut stream = Vec::default();
    for _ in 0..100 {
        let noise: Vec<u8> = (0..rng.gen_range(0..64)).map(|_| rng.gen()).collect();
        stream.extend(noise);
        let payload: Vec<u8> = (0..rng.gen_range(2..512)).map(|_| rng.gen()).collect();
        stream.extend(frame(&payload).unwrap());
    }

    let mut group = c.benchmark_group("extract");
    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.bench_function("bulk", |b| {
        b.iter(|| {
            let mut extractor = FrameExtractor::new();
            extractor.push(&stream);
            extractor.finish();
            std::iter::from_fn(|| extractor.next_frame()).count()
        });
    });
    group.bench_function("chunked_64", |b| {
        b.iter(|| {
            let mut extractor = FrameExtractor::new();
            let mut count = 0;
            for chunk in stream.chunks(64) {
                extractor.push(chunk);
                count += std::iter::from_fn(|| extractor.next_frame()).count();
            }
            count
        });
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let payload = msm7_payload();
    let registry = Registry::default();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("msm7", |b| {
        b.iter(|| {
            let mut cur = BitCursor::new(&payload);
            Msm7::decode(&mut Fields::new(&mut cur, 1077)).unwrap()
        });
    });
    group.bench_function("dispatch_msm7", |b| {
        b.iter(|| registry.decode_payload(1077, &payload).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_crc, bench_extract, bench_decode);
criterion_main!(benches);
