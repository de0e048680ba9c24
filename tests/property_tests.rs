use ctxmix::{compress_with, decompress_exact, decompress_with, Framing, MixerKind, ModelConfig};
use proptest::prelude::*;

fn tiny_config(mixer: MixerKind, match_model: bool) -> ModelConfig {
    ModelConfig {
        hashed_orders: vec![2, 4],
        hash_bits: 10,
        mixer,
        match_model,
        ..Default::default()
    }
}

fn mixer() -> impl Strategy<Value = MixerKind> {
    prop_oneof![Just(MixerKind::Linear), Just(MixerKind::Logistic)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sentinel_streams_round_trip(
        data in proptest::collection::vec(1_u8..=255, 0..2000),
        mixer in mixer(),
        match_model in any::<bool>(),
    ) {
        let config = tiny_config(mixer, match_model);
        let stream = compress_with(&data, &config, Framing::Sentinel).unwrap();
        prop_assert_eq!(decompress_with(&stream, &config).unwrap(), data);
    }

    #[test]
    fn length_framed_streams_round_trip(
        data in proptest::collection::vec(any::<u8>(), 0..2000),
        mixer in mixer(),
    ) {
        let config = tiny_config(mixer, false);
        let stream = compress_with(&data, &config, Framing::Length).unwrap();
        prop_assert_eq!(decompress_exact(&stream, &config, data.len()).unwrap(), data);
    }
}
