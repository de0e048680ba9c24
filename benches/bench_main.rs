use criterion::criterion_main;

mod benchmarks;

criterion_main! {
    benchmarks::coder::coder_benches,
    benchmarks::compressor::compressor_benches,
}
