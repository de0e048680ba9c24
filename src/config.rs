//! Model configuration.
//!
//! Encoder and decoder must be built from the same [`ModelConfig`]: the raw stream carries no
//! trace of it, while an [`Archive`](crate::archive::Archive) records it next to the stream.

use clap::ValueEnum;

use crate::error::{Error, Result};

/// Orders of the hashed long-context models used by default.
pub const DEFAULT_HASHED_ORDERS: [u8; 1] = [4];

/// Maximum order of a hashed model: the rolling window of recent bytes is a `u64`.
pub const MAX_HASHED_ORDER: u8 = 8;

/// Log2 of the number of slots of each hashed table (8 bytes per slot).
pub const DEFAULT_HASH_BITS: u32 = 22;

/// Log2 of the biggest hashed table that can be requested.
pub const MAX_HASH_BITS: u32 = 30;

/// Slowest adaptation shift of the adaptive counters: once warmed up, a counter moves by
/// `1 / 2^rate` of its distance from the observed bit.
pub const DEFAULT_COUNTER_RATE: u8 = 4;

/// Log2 of the size of the match model history buffer.
pub const DEFAULT_MATCH_BUFFER_BITS: u32 = 22;

/// Log2 of the number of slots of the XML model table.
pub const DEFAULT_XML_HASH_BITS: u32 = 20;

/// How the predictions of the context models are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum MixerKind {
    /// Weighted average of the probabilities, weights learnt with floating point LMS.
    #[default]
    Linear,
    /// Weighted sum in the logistic domain, integer arithmetic only.
    Logistic,
}

impl MixerKind {
    pub fn id(self) -> u8 {
        match self {
            MixerKind::Linear => 0,
            MixerKind::Logistic => 1,
        }
    }

    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            0 => Ok(MixerKind::Linear),
            1 => Ok(MixerKind::Logistic),
            _ => Err(Error::InvalidConfig(format!("unknown mixer id {id}"))),
        }
    }
}

/// The full set of knobs that shape the bitstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelConfig {
    /// One hashed long-context model is created for each order, in this order.
    pub hashed_orders: Vec<u8>,

    /// Log2 of the number of slots of each hashed table.
    pub hash_bits: u32,

    /// Slowest adaptation shift of the order-0/order-1 counters.
    pub counter_rate: u8,

    pub mixer: MixerKind,

    /// Adds the match model to the predictors.
    pub match_model: bool,

    /// Adds the XML structure model to the predictors.
    pub xml_model: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hashed_orders: DEFAULT_HASHED_ORDERS.to_vec(),
            hash_bits: DEFAULT_HASH_BITS,
            counter_rate: DEFAULT_COUNTER_RATE,
            mixer: MixerKind::default(),
            match_model: false,
            xml_model: false,
        }
    }
}

impl ModelConfig {
    /// Checks that every table can be built with the requested parameters.
    pub fn validate(&self) -> Result<()> {
        if let Some(order) = self
            .hashed_orders
            .iter()
            .find(|order| **order == 0 || **order > MAX_HASHED_ORDER)
        {
            return Err(Error::InvalidConfig(format!(
                "hashed order {order} is not in 1..={MAX_HASHED_ORDER}"
            )));
        }
        if self.hash_bits == 0 || self.hash_bits > MAX_HASH_BITS {
            return Err(Error::InvalidConfig(format!(
                "hash bits {} not in 1..={MAX_HASH_BITS}",
                self.hash_bits
            )));
        }
        if self.counter_rate == 0 || self.counter_rate > 12 {
            return Err(Error::InvalidConfig(format!(
                "counter rate {} not in 1..=12",
                self.counter_rate
            )));
        }
        Ok(())
    }

    /// Number of predictions fed to the mixer for every bit.
    pub fn num_inputs(&self) -> usize {
        2 + self.hashed_orders.len() + self.match_model as usize + self.xml_model as usize
    }
}

/// Command line arguments that build a [`ModelConfig`].
#[derive(clap::Args, Debug, Clone)]
pub struct ModelArgs {
    /// Order of a hashed long-context model; repeat to add more models.
    #[clap(long = "order", default_values_t = DEFAULT_HASHED_ORDERS.to_vec())]
    pub orders: Vec<u8>,

    /// Log2 of the number of slots of each hashed table.
    #[clap(long, default_value_t = DEFAULT_HASH_BITS)]
    pub hash_bits: u32,

    /// Slowest adaptation shift of the adaptive counters.
    #[clap(long, default_value_t = DEFAULT_COUNTER_RATE)]
    pub counter_rate: u8,

    /// How the model predictions are combined.
    #[clap(long, value_enum, default_value_t = MixerKind::Linear)]
    pub mixer: MixerKind,

    /// Predict from the longest earlier occurrence of the recent bytes.
    #[clap(long)]
    pub match_model: bool,

    /// Predict from the XML tag/attribute structure of the input.
    #[clap(long)]
    pub xml_model: bool,
}

impl From<ModelArgs> for ModelConfig {
    fn from(args: ModelArgs) -> Self {
        Self {
            hashed_orders: args.orders,
            hash_bits: args.hash_bits,
            counter_rate: args.counter_rate,
            mixer: args.mixer,
            match_model: args.match_model,
            xml_model: args.xml_model,
        }
    }
}
