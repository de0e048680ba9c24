use criterion::{black_box, criterion_group, Criterion};
use pprof::criterion::{Output, PProfProfiler};
use rand::prelude::SmallRng;
use rand::{Rng, SeedableRng};

use ctxmix::coder::{RangeDecoder, RangeEncoder};
use ctxmix::Prob;

/// Number of bits coded per iteration.
const BITS: usize = 1 << 20;

fn get_bits() -> Vec<(u8, Prob)> {
    let mut rng = SmallRng::seed_from_u64(0);
    (0..BITS)
        .map(|_| {
            let p: Prob = rng.gen_range(1..4096);
            let bit = (rng.gen_range(0..4096) < p) as u8;
            (bit, p)
        })
        .collect()
}

fn coder_benchmark(c: &mut Criterion) {
    let bits = get_bits();

    let mut encoder = RangeEncoder::new();
    for (bit, p) in &bits {
        encoder.encode_bit(*bit, *p).unwrap();
    }
    let stream = encoder.finish();

    let mut group = c.benchmark_group("range coder");
    group.throughput(criterion::Throughput::Elements(BITS as u64));
    group.bench_function("encoding", |b| {
        b.iter(|| {
            let mut encoder = RangeEncoder::new();
            for (bit, p) in &bits {
                encoder.encode_bit(*bit, *p).unwrap();
            }
            black_box(encoder.finish())
        })
    });
    group.bench_function("decoding", |b| {
        b.iter(|| {
            let mut decoder = RangeDecoder::new(&stream).unwrap();
            for (_, p) in &bits {
                black_box(decoder.decode_bit(*p).unwrap());
            }
        })
    });
    group.finish();
}

criterion_group! {
    name = coder_benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = coder_benchmark
}
