/*
 * Utility functions and consts used by the tests.
 *
 */

use ctxmix::ModelConfig;
use rand::prelude::{Distribution, SmallRng};
use rand::{Rng, SeedableRng};
use rand_distr::Zipf;

/// Size of the texts used to test.
pub const TEXT_LENGTH: usize = 100_000;

/// Number of distinct words of the synthetic texts.
const VOCABULARY_SIZE: u64 = 2_000;

/// A configuration with small tables, so that tests build their models quickly.
pub fn small_config() -> ModelConfig {
    ModelConfig {
        hash_bits: 14,
        ..Default::default()
    }
}

/// Creates [`TEXT_LENGTH`] bytes of markup-like text whose words are sampled from a Zipfian
/// distribution. The text never contains a zero byte.
pub fn get_text(seed: u64) -> Vec<u8> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let distribution = Zipf::new(VOCABULARY_SIZE, 1.1).unwrap();
    let mut text = Vec::with_capacity(TEXT_LENGTH + 64);

    while text.len() < TEXT_LENGTH {
        let word = distribution.sample(&mut rng) as u64;
        if word % 17 == 0 {
            text.extend_from_slice(format!("<title>w{word}</title>\n").as_bytes());
        } else {
            text.extend_from_slice(format!("w{word} ").as_bytes());
        }
    }
    text.truncate(TEXT_LENGTH);
    text
}

/// Creates `len` uniformly random bytes, zero excluded.
pub fn get_nonzero_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(1..=255)).collect()
}

/// Creates `len` uniformly random bytes.
pub fn get_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

/// Shows the logs of the library when the tests run with `RUST_LOG` set.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
