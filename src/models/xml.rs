use mem_dbg::{MemSize, SizeFlags};

use crate::models::hashed::finalize;
use crate::models::{ContextModel, HashTable, Input};
use crate::{Node, Prob};

/// Tag and attribute names longer than this are hashed on their first bytes only.
const MAX_NAME_LEN: u8 = 63;

const NODE_SPREAD: u64 = 0x9E37_79B9_7F4A_7C15;

/// Where the last byte left the XML scanner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XmlState {
    Text,
    /// Inside `<...` before the first space.
    Tag,
    /// Inside a tag, after its name.
    Attribute,
    /// Inside `&...;`.
    Entity,
}

impl XmlState {
    fn id(self) -> u64 {
        match self {
            XmlState::Text => 0,
            XmlState::Tag => 1,
            XmlState::Attribute => 2,
            XmlState::Entity => 3,
        }
    }
}

/// Byte-level XML scanner tracking the names of the current tag, attribute and element.
#[derive(Clone, Debug)]
pub struct XmlScanner {
    state: XmlState,
    tag_hash: u32,
    tag_len: u8,
    attr_hash: u32,
    attr_len: u8,
    /// Hash of the name of the last tag that was closed with `>`.
    element_hash: u32,
}

impl Default for XmlScanner {
    fn default() -> Self {
        Self {
            state: XmlState::Text,
            tag_hash: 0,
            tag_len: 0,
            attr_hash: 0,
            attr_len: 0,
            element_hash: 0,
        }
    }
}

impl XmlScanner {
    pub fn state(&self) -> XmlState {
        self.state
    }

    /// Returns the hash of the structure the next byte belongs to.
    pub fn structure(&self) -> u32 {
        match self.state {
            XmlState::Text => self.element_hash,
            XmlState::Tag => self.tag_hash,
            XmlState::Attribute => self.attr_hash,
            XmlState::Entity => u32::MAX,
        }
    }

    pub fn push(&mut self, byte: u8) {
        match self.state {
            XmlState::Text => match byte {
                b'<' => {
                    self.state = XmlState::Tag;
                    self.tag_hash = 0;
                    self.tag_len = 0;
                }
                b'&' => self.state = XmlState::Entity,
                _ => {}
            },
            XmlState::Tag => match byte {
                b' ' => {
                    self.state = XmlState::Attribute;
                    self.attr_hash = 0;
                    self.attr_len = 0;
                }
                b'>' => {
                    self.state = XmlState::Text;
                    self.element_hash = self.tag_hash;
                }
                _ if self.tag_len < MAX_NAME_LEN => {
                    self.tag_hash = self.tag_hash.wrapping_mul(31).wrapping_add(byte as u32);
                    self.tag_len += 1;
                }
                _ => {}
            },
            XmlState::Attribute => match byte {
                b'>' => {
                    self.state = XmlState::Text;
                    self.element_hash = self.tag_hash;
                }
                b'=' | b' ' => {}
                _ if self.attr_len < MAX_NAME_LEN => {
                    self.attr_hash = self.attr_hash.wrapping_mul(31).wrapping_add(byte as u32);
                    self.attr_len += 1;
                }
                _ => {}
            },
            XmlState::Entity => {
                if byte == b';' {
                    self.state = XmlState::Text;
                }
            }
        }
    }
}

/// Predicts each bit from the XML structure around it (enclosing element, tag or attribute
/// name) and the previous byte, through a [`HashTable`].
#[derive(Clone, Debug)]
pub struct XmlModel {
    scanner: XmlScanner,
    last_byte: u8,
    context: u64,
    table: HashTable,
    index: usize,
    check: u32,
}

impl XmlModel {
    pub fn new(hash_bits: u32) -> Self {
        let mut model = Self {
            scanner: XmlScanner::default(),
            last_byte: 0,
            context: 0,
            table: HashTable::new(hash_bits),
            index: 0,
            check: 0,
        };
        model.refresh_context();
        model
    }

    pub fn scanner(&self) -> &XmlScanner {
        &self.scanner
    }

    fn refresh_context(&mut self) {
        self.context = finalize(
            (self.scanner.state().id() << 40)
                | ((self.last_byte as u64) << 32)
                | self.scanner.structure() as u64,
        );
    }
}

impl ContextModel for XmlModel {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn update_context(&mut self, input: Input) {
        match input {
            Input::Byte(byte) => {
                self.scanner.push(byte);
                self.last_byte = byte;
            }
            Input::EndOfStream => {
                self.scanner = XmlScanner::default();
                self.last_byte = 0;
            }
        }
        self.refresh_context();
    }

    #[inline]
    fn predict(&mut self, node: Node) -> Prob {
        let (index, check) = self
            .table
            .locate(self.context ^ (node as u64).wrapping_mul(NODE_SPREAD));
        self.index = index;
        self.check = check;
        self.table.predict(index, check)
    }

    #[inline]
    fn adapt(&mut self, bit: u8) {
        self.table.update(self.index, self.check, bit);
    }

    fn table_bytes(&self) -> usize {
        self.table.mem_size(SizeFlags::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(data: &[u8]) -> XmlScanner {
        let mut scanner = XmlScanner::default();
        data.iter().for_each(|byte| scanner.push(*byte));
        scanner
    }

    #[test]
    fn test_scanner_states() {
        assert_eq!(scan(b"plain text").state(), XmlState::Text);
        assert_eq!(scan(b"<tit").state(), XmlState::Tag);
        assert_eq!(scan(b"<page id").state(), XmlState::Attribute);
        assert_eq!(scan(b"a &amp").state(), XmlState::Entity);
        assert_eq!(scan(b"a &amp; b").state(), XmlState::Text);
    }

    #[test]
    fn test_element_is_remembered_inside_text() {
        let title = scan(b"<title>");
        let title_again = scan(b"<page><title>Anarchism");
        let text = scan(b"<text>");

        assert_eq!(title.structure(), title_again.structure());
        assert_ne!(title.structure(), text.structure());
    }

    #[test]
    fn test_attributes_close_into_their_element() {
        let with_attr = scan(b"<text xml:space=\"preserve\">");
        let without = scan(b"<text>");
        assert_eq!(with_attr.state(), XmlState::Text);
        assert_eq!(with_attr.structure(), without.structure());
    }

    #[test]
    fn test_model_follows_the_document_and_resets_at_the_end() {
        let mut model = XmlModel::new(10);
        for byte in b"<page><title>Ana" {
            model.update_context(Input::Byte(*byte));
        }
        assert_eq!(model.scanner().state(), XmlState::Text);
        assert_eq!(
            model.scanner().structure(),
            scan(b"<title>").structure()
        );

        model.update_context(Input::Byte(b'<'));
        assert_eq!(model.scanner().state(), XmlState::Tag);

        model.update_context(Input::EndOfStream);
        assert_eq!(model.scanner().state(), XmlScanner::default().state());
        assert_eq!(
            model.scanner().structure(),
            XmlScanner::default().structure()
        );
    }
}
