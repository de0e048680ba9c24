use rand::prelude::{Distribution, SmallRng};
use rand::SeedableRng;
use rand_distr::Zipf;

pub mod coder;
pub mod compressor;

/// Size of the input used to bench.
const INPUT_LENGTH: usize = 1 << 20;

/// Number of distinct words of the synthetic text.
const VOCABULARY_SIZE: u64 = 5_000;

/// Returns [`INPUT_LENGTH`] bytes of synthetic markup whose words follow a Zipfian distribution.
/// The output never contains a zero byte.
pub fn get_text() -> Vec<u8> {
    let mut rng = SmallRng::seed_from_u64(0);
    let distribution = Zipf::new(VOCABULARY_SIZE, 1.1).unwrap();
    let mut text = Vec::with_capacity(INPUT_LENGTH + 64);

    while text.len() < INPUT_LENGTH {
        text.extend_from_slice(b"<w>");
        let word = distribution.sample(&mut rng) as u64;
        text.extend_from_slice(format!("word{word}").as_bytes());
        text.extend_from_slice(b"</w>\n");
    }
    text.truncate(INPUT_LENGTH);
    text
}
