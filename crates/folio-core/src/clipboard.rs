//! Single-slot block clipboard.

use crate::block::{Block, NewBlock};
use std::cell::RefCell;
use std::rc::Rc;

/// Clipboard shared by every editor session in the process.
pub type SharedClipboard = Rc<RefCell<Clipboard>>;

/// Holds at most one copied block, without its id.
///
/// Pasting does not consume the slot, and nothing clears it implicitly.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    slot: Option<NewBlock>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh clipboard wrapped for sharing between sessions.
    pub fn shared() -> SharedClipboard {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Store a copy of `block`, replacing whatever was there.
    pub fn copy(&mut self, block: &Block) {
        log::debug!("Copied {} block {}", block.block_type, block.id);
        self.slot = Some(block.to_new_block());
    }

    /// A copy of the stored block, ready to be added under a new id.
    pub fn paste(&self) -> Option<NewBlock> {
        self.slot.clone()
    }

    pub fn has_content(&self) -> bool {
        self.slot.is_some()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockContent, BlockType};
    use crate::geometry::Position;

    fn block() -> Block {
        NewBlock::new(BlockType::TipBlock, Position::mm(10.0, 10.0, 50.0, 20.0))
            .with_content(BlockContent::Text("Carry cash".to_string()))
            .into_block()
    }

    #[test]
    fn test_empty_clipboard() {
        let clipboard = Clipboard::new();
        assert!(!clipboard.has_content());
        assert!(clipboard.paste().is_none());
    }

    #[test]
    fn test_paste_is_repeatable() {
        let mut clipboard = Clipboard::new();
        let original = block();
        clipboard.copy(&original);
        let first = clipboard.paste().unwrap();
        let second = clipboard.paste().unwrap();
        assert_eq!(first, second);
        assert_eq!(first, original.to_new_block());
        assert!(clipboard.has_content());
    }

    #[test]
    fn test_copy_is_detached_from_source() {
        let mut clipboard = Clipboard::new();
        let mut original = block();
        clipboard.copy(&original);
        original.content = BlockContent::Text("changed".to_string());
        assert_eq!(clipboard.paste().unwrap().content.as_text(), Some("Carry cash"));
    }

    #[test]
    fn test_clear() {
        let mut clipboard = Clipboard::new();
        clipboard.copy(&block());
        clipboard.clear();
        assert!(!clipboard.has_content());
    }
}
