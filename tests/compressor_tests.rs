mod common;

use ctxmix::mixer::LinearMixer;
use ctxmix::utils::order0_bound_bits;
use ctxmix::{
    compress, compress_with, decompress, decompress_exact, decompress_with, Compressor,
    Decompressor, Error, Framing, MixerKind, ModelConfig,
};
use rstest::*;

use crate::common::*;

#[rstest]
#[case(small_config())]
#[case(ModelConfig { mixer: MixerKind::Logistic, ..small_config() })]
#[case(ModelConfig { hashed_orders: vec![1, 2, 3, 5, 8], ..small_config() })]
#[case(ModelConfig { hashed_orders: Vec::new(), ..small_config() })]
#[case(ModelConfig { match_model: true, ..small_config() })]
#[case(ModelConfig { xml_model: true, mixer: MixerKind::Logistic, ..small_config() })]
#[case(ModelConfig { hash_bits: 1, ..small_config() })]
#[case(ModelConfig { counter_rate: 12, ..small_config() })]
fn decompressor_decodes_correctly(#[case] config: ModelConfig) {
    let text = get_text(0);
    let stream = compress_with(&text, &config, Framing::Sentinel).unwrap();
    assert_eq!(decompress_with(&stream, &config).unwrap(), text);

    let random = get_nonzero_bytes(1, 10_000);
    let stream = compress_with(&random, &config, Framing::Sentinel).unwrap();
    assert_eq!(decompress_with(&stream, &config).unwrap(), random);
}

#[test]
fn default_models_decode_correctly() {
    let text = get_text(2);
    assert_eq!(decompress(&compress(&text).unwrap()).unwrap(), text);
}

#[test]
fn compression_is_deterministic() {
    let text = get_text(4);
    let config = ModelConfig {
        match_model: true,
        xml_model: true,
        ..small_config()
    };
    let first = compress_with(&text, &config, Framing::Sentinel).unwrap();
    let second = compress_with(&text, &config, Framing::Sentinel).unwrap();
    assert_eq!(first, second);
}

#[test]
fn different_configurations_give_different_streams() {
    let text = get_text(5);
    let linear = compress_with(&text, &small_config(), Framing::Sentinel).unwrap();
    let logistic = compress_with(
        &text,
        &ModelConfig {
            mixer: MixerKind::Logistic,
            ..small_config()
        },
        Framing::Sentinel,
    )
    .unwrap();
    assert_ne!(linear, logistic);
}

#[test]
fn empty_input_is_just_the_end_marker() {
    let stream = compress_with(&[], &small_config(), Framing::Sentinel).unwrap();
    assert!(!stream.is_empty());

    let mut decompressor =
        Decompressor::<LinearMixer>::new(&small_config(), &stream, Framing::Sentinel).unwrap();
    assert_eq!(decompressor.decode_byte().unwrap(), None);
    assert!(decompressor.is_finished());
    assert_eq!(decompressor.consumed(), stream.len());
}

#[test]
fn single_byte_stops_at_the_end_marker() {
    let stream = compress_with(b"A", &small_config(), Framing::Sentinel).unwrap();

    // garbage after the stream must not be read
    let mut padded = stream.clone();
    padded.extend_from_slice(&[0xAA; 16]);

    let mut decompressor =
        Decompressor::<LinearMixer>::new(&small_config(), &padded, Framing::Sentinel).unwrap();
    assert_eq!(decompressor.decode_byte().unwrap(), Some(b'A'));
    assert_eq!(decompressor.decode_byte().unwrap(), None);
    assert_eq!(decompressor.decode_byte().unwrap(), None);
    assert_eq!(decompressor.consumed(), stream.len());
    assert_eq!(decompressor.bytes_out(), 1);
}

#[test]
fn zero_bytes_are_rejected_by_sentinel_framing() {
    let mut data = get_nonzero_bytes(6, 1000);
    data[777] = 0;
    assert!(matches!(
        compress_with(&data, &small_config(), Framing::Sentinel),
        Err(Error::ZeroByteInInput { offset: 777 })
    ));
}

#[rstest]
#[case(MixerKind::Linear)]
#[case(MixerKind::Logistic)]
fn length_framing_handles_binary_data(#[case] mixer: MixerKind) {
    let config = ModelConfig {
        mixer,
        ..small_config()
    };
    let data = get_bytes(7, 20_000);
    assert!(data.contains(&0));

    let stream = compress_with(&data, &config, Framing::Length).unwrap();
    assert_eq!(decompress_exact(&stream, &config, data.len()).unwrap(), data);

    let zeros = vec![0; 5_000];
    let stream = compress_with(&zeros, &config, Framing::Length).unwrap();
    assert_eq!(decompress_exact(&stream, &config, zeros.len()).unwrap(), zeros);
}

#[test]
fn decoding_past_the_end_marker_fails() {
    let stream = compress_with(b"abc", &small_config(), Framing::Sentinel).unwrap();
    let mut decompressor =
        Decompressor::<LinearMixer>::new(&small_config(), &stream, Framing::Sentinel).unwrap();
    let mut out = Vec::new();
    assert!(matches!(
        decompressor.decode_exact(4, &mut out),
        Err(Error::UnexpectedEndOfStream)
    ));
    assert_eq!(out, b"abc");
}

#[test]
fn repetitive_input_costs_almost_nothing() {
    let data = vec![b'a'; 10_000];
    let stream = compress_with(&data, &small_config(), Framing::Sentinel).unwrap();
    assert!(stream.len() < 250, "{} bytes", stream.len());
    assert_eq!(decompress_with(&stream, &small_config()).unwrap(), data);
}

#[test]
fn text_is_compressed_below_the_order0_bound() {
    let text = get_text(8);
    let config = ModelConfig {
        hashed_orders: vec![2, 4],
        hash_bits: 18,
        ..Default::default()
    };
    let stream = compress_with(&text, &config, Framing::Sentinel).unwrap();
    let bound = order0_bound_bits(&text) / 8.0;
    assert!(
        (stream.len() as f64) < bound * 0.9,
        "{} bytes, order-0 bound {bound}",
        stream.len()
    );
}

#[test]
fn streaming_matches_one_shot() {
    let text = get_text(9);
    let one_shot = compress_with(&text, &small_config(), Framing::Sentinel).unwrap();

    let mut compressor =
        Compressor::<LinearMixer>::new(&small_config(), Framing::Sentinel).unwrap();
    let mut stream = Vec::new();
    for chunk in text.chunks(4096) {
        compressor.push(chunk).unwrap();
        stream.extend(compressor.take_output());
    }
    assert_eq!(compressor.bytes_in(), text.len() as u64);
    stream.extend(compressor.finish().unwrap());

    assert_eq!(stream, one_shot);
}

#[test]
fn invalid_configurations_are_rejected() {
    let config = ModelConfig {
        hashed_orders: vec![0],
        ..small_config()
    };
    assert!(matches!(
        compress_with(b"abc", &config, Framing::Sentinel),
        Err(Error::InvalidConfig(_))
    ));
}
