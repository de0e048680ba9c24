use criterion::{black_box, criterion_group, BenchmarkId, Criterion};
use pprof::criterion::{Output, PProfProfiler};

use ctxmix::{compress_with, decompress_with, Framing, MixerKind, ModelConfig};

use crate::benchmarks::get_text;

fn compressor_benchmark(c: &mut Criterion) {
    let text = get_text();

    let mut group = c.benchmark_group("compressor");
    group.throughput(criterion::Throughput::Bytes(text.len() as u64));
    // a full pass over the input takes a while, so reduce the sample size
    group.sample_size(10);

    for mixer in [MixerKind::Linear, MixerKind::Logistic] {
        let config = ModelConfig {
            mixer,
            ..Default::default()
        };
        let stream = compress_with(&text, &config, Framing::Sentinel).unwrap();

        group.bench_with_input(
            BenchmarkId::new("compress", format!("{mixer:?}")),
            &config,
            |b, config| b.iter(|| black_box(compress_with(&text, config, Framing::Sentinel).unwrap())),
        );
        group.bench_with_input(
            BenchmarkId::new("decompress", format!("{mixer:?}")),
            &config,
            |b, config| b.iter(|| black_box(decompress_with(&stream, config).unwrap())),
        );
    }
    group.finish();
}

criterion_group! {
    name = compressor_benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = compressor_benchmark
}
