use log::debug;

use crate::config::{ModelConfig, DEFAULT_MATCH_BUFFER_BITS, DEFAULT_XML_HASH_BITS};
use crate::error::Result;
use crate::mixer::Mix;
use crate::models::{ContextModel, HashedModel, Input, MatchModel, Order0, Order1, XmlModel};
use crate::{Node, Prob};

/// The model side of the coding loop, identical for encoder and decoder.
///
/// For each bit, [`p`](Self::p) asks every context model for a prediction, in a fixed order, and
/// mixes them; [`update`](Self::update) then teaches the true bit to models and mixer and advances
/// the bit-context node. Once a byte is complete the driver reports it with
/// [`update_context`](Self::update_context).
pub struct Predictor<M: Mix> {
    models: Vec<Box<dyn ContextModel>>,

    mixer: M,

    /// The predictions of the models for the current bit, in mixing order.
    inputs: Vec<Prob>,

    /// The bits of the current byte seen so far, with a leading 1.
    node: Node,

    /// Set between the 8th bit of a byte and the matching call to `update_context`.
    byte_complete: bool,
}

impl<M: Mix> Predictor<M> {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        config.validate()?;

        let mut models: Vec<Box<dyn ContextModel>> = vec![
            Box::new(Order0::new(config.counter_rate)),
            Box::new(Order1::new(config.counter_rate)),
        ];
        for order in &config.hashed_orders {
            models.push(Box::new(HashedModel::new(*order, config.hash_bits)));
        }
        if config.match_model {
            models.push(Box::new(MatchModel::new(DEFAULT_MATCH_BUFFER_BITS)));
        }
        if config.xml_model {
            models.push(Box::new(XmlModel::new(DEFAULT_XML_HASH_BITS)));
        }

        for model in &models {
            debug!("{} model: {} bytes", model.name(), model.table_bytes());
        }

        Ok(Self {
            mixer: M::new(models.len()),
            inputs: Vec::with_capacity(models.len()),
            models,
            node: 1,
            byte_complete: false,
        })
    }

    /// Predicts the next bit.
    #[inline]
    pub fn p(&mut self) -> Prob {
        debug_assert!(!self.byte_complete, "update_context was not called");

        self.inputs.clear();
        for model in self.models.iter_mut() {
            let p = model.predict(self.node);
            self.inputs.push(p);
            self.mixer.add(p);
        }
        self.mixer.get()
    }

    /// Learns the true bit. Returns the byte completed by this bit, if any; in that case the node
    /// is back to 1 and the caller must report the byte with [`update_context`](Self::update_context)
    /// before the next prediction.
    #[inline]
    pub fn update(&mut self, bit: u8) -> Option<u8> {
        for model in self.models.iter_mut() {
            model.adapt(bit);
        }
        self.mixer.update(bit);

        self.node = (self.node << 1) | bit as Node;
        if self.node >= 0x100 {
            let byte = (self.node & 0xFF) as u8;
            self.node = 1;
            self.byte_complete = true;
            return Some(byte);
        }
        None
    }

    /// Rolls the history of every model forward.
    pub fn update_context(&mut self, input: Input) {
        debug_assert_eq!(self.node, 1, "update_context called in the middle of a byte");

        for model in self.models.iter_mut() {
            model.update_context(input);
        }
        self.byte_complete = false;
    }

    /// The predictions of the individual models for the last bit, in mixing order.
    pub fn inputs(&self) -> &[Prob] {
        &self.inputs
    }

    pub fn node(&self) -> Node {
        self.node
    }

    /// The names of the models, in mixing order.
    pub fn model_names(&self) -> Vec<&'static str> {
        self.models.iter().map(|model| model.name()).collect()
    }

    /// Memory used by the tables of all models, in bytes.
    pub fn table_bytes(&self) -> usize {
        self.models.iter().map(|model| model.table_bytes()).sum()
    }
}
